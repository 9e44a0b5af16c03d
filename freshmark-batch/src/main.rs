use freshmark_core::source::{InventorySource, ResultSink, SalesSource};
use freshmark_engine::pipeline::PricingPipeline;
use freshmark_store::app_config::Config;
use freshmark_store::{CsvInventorySource, CsvSalesSource, JsonModelStore, JsonResultSink};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "freshmark_batch=info,freshmark_engine=info,freshmark_store=info".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        mode = ?config.pricing.mode,
        strategy = ?config.pricing.live_strategy,
        "starting freshmark pricing run"
    );

    // The model is loaded once and stays read-only for the whole run; if it
    // cannot be loaded there is nothing useful this job can do.
    let predictor = JsonModelStore::new(&config.model.path).load()?;
    let pipeline = PricingPipeline::new(predictor, config.pricing.live_strategy);

    let inventory_source: Box<dyn InventorySource> =
        Box::new(CsvInventorySource::new(&config.data.inventory_csv));
    let sales_source: Box<dyn SalesSource> = Box::new(CsvSalesSource::new(&config.data.sales_csv));
    let sink: Box<dyn ResultSink> = Box::new(JsonResultSink::new(&config.results.path));

    let inventory = inventory_source
        .load_inventory()
        .map_err(|e| anyhow::anyhow!(e))?;
    let sales = sales_source.load_sales().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        inventory = inventory.len(),
        sales = sales.len(),
        "data loaded"
    );

    let recommendations = pipeline.run(config.pricing.mode, &inventory, &sales);

    sink.persist(&recommendations)
        .map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        count = recommendations.len(),
        path = %config.results.path,
        "recommendations persisted"
    );

    Ok(())
}
