use anyhow::Result;
use pv_theoretical::{catalog::ReferenceData, config, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cfg = Config::load()?;
    init_tracing(cfg.log.format);
    let reference = ReferenceData::load(&cfg.catalog)?;
    info!(
        modules = reference.modules.len(),
        inverters = reference.inverters.len(),
        "reference data loaded"
    );

    let window = cfg.run.window_now();
    run(&cfg, &reference, window).await
}

#[cfg(feature = "db")]
async fn run(cfg: &Config, reference: &ReferenceData, window: config::RunWindow) -> Result<()> {
    use config::SinkKind;
    use pv_theoretical::database::{Database, PgSource};
    use pv_theoretical::export::CsvSink;
    use pv_theoretical::pipeline::{ReportSink, TheoreticalRun};

    let db = Database::new(&cfg.db).await?;
    let source = PgSource::new(db.pool().clone(), cfg.output.tables.clone());

    let csv_sink;
    let sink: &dyn ReportSink = match cfg.output.sink {
        SinkKind::Database => {
            db.verify_schema(&cfg.output.tables).await?;
            &source
        }
        SinkKind::Csv => {
            csv_sink = CsvSink::new(&cfg.output.csv_dir, cfg.output.tables.clone());
            &csv_sink
        }
    };

    let summary = TheoreticalRun::new(&source, reference, cfg.degradation)
        .run(sink, &cfg.run, window)
        .await?;
    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed,
        "shutting down"
    );

    db.close().await;
    Ok(())
}

#[cfg(not(feature = "db"))]
async fn run(_cfg: &Config, _reference: &ReferenceData, _window: config::RunWindow) -> Result<()> {
    anyhow::bail!("built without database support; enable the `db` feature")
}
