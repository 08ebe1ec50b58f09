use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use configs::AppConfig;
use dotenvy::dotenv;
use models::{AggregateQuery, FilterState, SortBy, SortOrder, SortSpec};
use service::reviews::http::{HttpClient, HttpListingDirectory, HttpReviewSource};
use service::reviews::ReviewAggregationService;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Aggregate every review a vendor has received across their listings.
#[derive(Parser, Debug)]
#[command(name = "reviews")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Vendor whose listings are aggregated
    vendor_id: String,

    /// Rating filter: all, 5, 4, 3, 2 or 1
    #[arg(long)]
    filter: Option<FilterState>,

    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Items per page (defaults to aggregation.default_page_limit)
    #[arg(long)]
    limit: Option<u32>,

    /// createdAt, rating or helpful
    #[arg(long, default_value = "createdAt")]
    sort_by: SortBy,

    /// asc or desc
    #[arg(long, default_value = "desc")]
    sort_order: SortOrder,

    /// Dashboard view: the three newest reviews plus statistics
    #[arg(long, conflicts_with_all = ["filter", "page", "limit"])]
    latest: bool,

    #[arg(long)]
    json_logs: bool,

    /// Print Prometheus metrics to stderr after the result
    #[arg(long)]
    metrics: bool,
}

fn init_logging(json: bool) {
    if json {
        common::utils::logging::init_logging_json();
    } else {
        common::utils::logging::init_logging_default();
    }
    info!(service = "reviews", event = "logger_init", "tracing subscriber initialized");
}

fn resolve_config(loaded: anyhow::Result<AppConfig>) -> Option<AppConfig> {
    match loaded {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!(service = "reviews", event = "config_fallback", error = %e, "config.toml unusable, falling back to environment");
            match AppConfig::from_env() {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    error!(service = "reviews", event = "config_invalid", error = %e, "no usable configuration");
                    None
                }
            }
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    // 先加载 .env，使 RUST_LOG / API_BASE_URL 等变量对日志和配置生效
    dotenv().ok();
    let loaded = AppConfig::load_and_validate();
    let json_logs = args.json_logs || loaded.as_ref().map(|c| c.runtime.json_logs).unwrap_or(false);
    init_logging(json_logs);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "reviews", event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    let Some(cfg) = resolve_config(loaded) else {
        return ExitCode::FAILURE;
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.runtime.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "reviews", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let http = match HttpClient::new(&cfg.upstream) {
        Ok(http) => http,
        Err(e) => {
            error!(service = "reviews", event = "client_build_failed", code = e.code(), error = %e, "failed to build upstream client");
            return ExitCode::FAILURE;
        }
    };
    let svc = ReviewAggregationService::new(
        Arc::new(HttpListingDirectory::new(http.clone())),
        Arc::new(HttpReviewSource::new(http)),
        &cfg.aggregation,
    );

    info!(
        service = "reviews",
        event = "start",
        %service_id,
        pid,
        version = env!("CARGO_PKG_VERSION"),
        vendor_id = %args.vendor_id,
        base_url = %cfg.upstream.base_url,
        "aggregating vendor reviews"
    );

    let limit = args.limit.unwrap_or(cfg.aggregation.default_page_limit);
    let result = rt.block_on(async {
        if args.latest {
            svc.get_latest(&args.vendor_id).await
        } else if let Some(filter) = args.filter {
            svc.get_filtered_aggregate(&args.vendor_id, filter, args.page, limit).await
        } else {
            let sort = SortSpec::new(args.sort_by, args.sort_order);
            svc.get_aggregate(&args.vendor_id, AggregateQuery::new(args.page, limit, sort)).await
        }
    });

    match serde_json::to_string_pretty(&result) {
        Ok(body) => println!("{body}"),
        Err(e) => {
            error!(service = "reviews", event = "encode_failed", error = %e, "failed to encode result");
            return ExitCode::FAILURE;
        }
    }

    if args.metrics {
        match service::observability::encode_metrics() {
            Ok(text) => eprintln!("{text}"),
            Err(e) => warn!(service = "reviews", event = "metrics_failed", error = %e, "failed to encode metrics"),
        }
    }

    info!(service = "reviews", event = "stop", %service_id, pid, "done");
    ExitCode::SUCCESS
}
