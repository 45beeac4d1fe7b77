mod jobs;

use cineseat_engine::SeatEngine;
use cineseat_types::AppConfig;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cineseat_jobs=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CineSeat background jobs...");

    let config = AppConfig::from_env();

    // Initialize database pool
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = cineseat_db::create_pool(&database_url).await?;

    tracing::info!("✓ Database connection established");

    // Connect the seat engine (loads the reservation scripts)
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
    let engine = SeatEngine::connect(&redis_url).await?;

    tracing::info!("✓ Seat engine connected");

    // Initialize job scheduler
    let scheduler = JobScheduler::new().await?;

    // Job 1: Expire unpaid holds (every 1 minute by default)
    let reaper_cron = if config.reaper_period_secs >= 60 {
        "0 * * * * *".to_string()
    } else {
        format!("*/{} * * * * *", config.reaper_period_secs)
    };

    let pool_clone = pool.clone();
    let engine_clone = engine.clone();
    let parallelism = config.batch_cleanup_parallelism;
    let expire_job = Job::new_async(reaper_cron.as_str(), move |_uuid, _l| {
        let pool = pool_clone.clone();
        let engine = engine_clone.clone();
        Box::pin(async move {
            tracing::debug!("Running expire_unpaid_holds job");
            if let Err(e) = jobs::expire_unpaid_holds(&pool, &engine, parallelism).await {
                tracing::error!("expire_unpaid_holds job failed: {}", e);
            }
        })
    })?;

    scheduler.add(expire_job).await?;

    tracing::info!("✓ Registered job: expire_unpaid_holds ({})", reaper_cron);

    // Job 2: Purge expired idempotency records (daily at 03:00)
    let pool_clone = pool.clone();
    let purge_job = Job::new_async("0 0 3 * * *", move |_uuid, _l| {
        let pool = pool_clone.clone();
        Box::pin(async move {
            tracing::info!("Running purge_idempotency_keys job");
            if let Err(e) = jobs::purge_idempotency_keys(&pool).await {
                tracing::error!("purge_idempotency_keys job failed: {}", e);
            }
        })
    })?;

    scheduler.add(purge_job).await?;

    tracing::info!("✓ Registered job: purge_idempotency_keys (daily at 03:00)");

    // Run the reaper immediately if --run-reaper flag is present
    let args: Vec<String> = std::env::args().collect();
    if args.contains(&"--run-reaper".to_string()) {
        tracing::info!("Running expiry reaper immediately...");
        if let Err(e) = jobs::expire_unpaid_holds(&pool, &engine, config.batch_cleanup_parallelism).await
        {
            tracing::error!("Reaper run failed: {}", e);
        } else {
            tracing::info!("✓ Reaper run completed");
        }
        return Ok(());
    }

    // Start scheduler
    scheduler.start().await?;

    tracing::info!("✓ Job scheduler started");
    tracing::info!("📡 Background jobs running");

    // Keep the process running
    loop {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
    }
}
