//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, OutputFormat};
use crate::config::{self, Context};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let out = match ctx.global.output {
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&ctx.config)
                    .map_err(|e| CliError::Render {
                        format: "toml".into(),
                        message: e.to_string(),
                    })?,
                format => {
                    output::render_single(format, &ctx.config, |_| String::new(), |_| String::new())?
                }
            };
            output::print_output(out.trim_end(), ctx.global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let path = ctx.global.config.clone().unwrap_or_else(config::config_path);
            output::print_output(&path.display().to_string(), ctx.global.quiet);
            Ok(())
        }
    }
}
