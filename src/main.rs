use schema_migrator::config;
use schema_migrator::pipeline::{self, Outcome};
use schema_migrator::prompt::LineEditor;
use schema_migrator::resource::json::ResourceSet;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "resources.json".to_owned());

    if let Err(err) = run(&path) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(path: &str) -> schema_migrator::error::MigrationResult<()> {
    let config = config::get();
    let text = std::fs::read_to_string(path)?;
    let resource_set = ResourceSet::from_json(&text)?;
    let handles = resource_set.handles();
    let resources: Vec<&dyn schema_migrator::resource::ResourceHandle> =
        handles.iter().map(|handle| handle as &dyn schema_migrator::resource::ResourceHandle).collect();

    let mut prompter = LineEditor::new()?;
    match pipeline::run(&resources, &resource_set, config, &mut prompter)? {
        Outcome::Written { migration_path, module_name } => {
            if !config.quiet {
                println!("Wrote {module_name} to {}", migration_path.display());
            }
        }
        Outcome::NoChanges => {
            if !config.quiet {
                println!("No schema changes detected.");
            }
        }
    }
    Ok(())
}
