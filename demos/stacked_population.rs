use dvcrust::chart::load_stacked_population;
use dvcrust::io::export::export_chart_source;
use dvcrust::PipelineConfig;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dvcrust=info".into()),
        )
        .init();

    // Reads data/demographics_switzerland_bag.csv unless DVC_DATA_DIR says otherwise.
    let cfg = PipelineConfig::from_env()?;
    let source = load_stacked_population(&cfg)?;

    println!("canton/age_group,female,male");
    for row in source.stacked.rows.iter().take(10) {
        println!("{},{:.0},{:.0}", row.key, row.values[0], row.values[1]);
    }

    let paths = export_chart_source(&cfg.export_dir, "population_stacks", &source)?;
    println!("wrote {} and {}", paths.csv.display(), paths.json.display());
    Ok(())
}
