use clap::Args;

use crate::cli::OutputFormat;
use crate::plugin;

#[derive(Args)]
pub struct InfoArgs {
    /// Name of the aligner plugin
    #[arg(long, default_value = plugin::null::PLUGIN_NAME)]
    pub plugin: String,

    /// List the names of all available plugins instead
    #[arg(long)]
    pub list: bool,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> anyhow::Result<()> {
    if args.list {
        let names = plugin::available();
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
            OutputFormat::Text | OutputFormat::Tsv => {
                for name in names {
                    println!("{name}");
                }
            }
        }
        return Ok(());
    }

    let plugin = plugin::load_aligner(&args.plugin)?;
    let name = plugin.aligner_name();
    let aligner_version = plugin.aligner_version();
    let plugin_version = plugin.plugin_version();

    match format {
        OutputFormat::Text => {
            println!("Plugin:          {}", args.plugin);
            println!("Aligner:         {name}");
            println!("Aligner version: {aligner_version}");
            println!("Plugin version:  {plugin_version}");
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "plugin": args.plugin,
                "aligner_name": name,
                "aligner_version": aligner_version,
                "plugin_version": plugin_version,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("plugin\taligner_name\taligner_version\tplugin_version");
            println!("{}\t{name}\t{aligner_version}\t{plugin_version}", args.plugin);
        }
    }

    Ok(())
}
