//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::error::Result;
use tribunal_pipeline::PipelineConfig;

/// Execute the config command.
pub fn execute_config(args: ConfigArgs, loaded: PipelineConfig) -> Result<()> {
    print!("{}", render_config(&args, loaded)?);
    Ok(())
}

/// Render the selected preset, or the loaded configuration, as TOML.
pub(crate) fn render_config(args: &ConfigArgs, loaded: PipelineConfig) -> Result<String> {
    let config = match args.preset {
        Some(preset) => PipelineConfig::from(preset),
        None => loaded,
    };
    Ok(config.to_toml()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PresetArg;

    #[test]
    fn test_preset_round_trips() {
        let args = ConfigArgs {
            preset: Some(PresetArg::Strict),
        };
        let rendered = render_config(&args, PipelineConfig::default()).unwrap();
        assert_eq!(
            PipelineConfig::from_toml(&rendered).unwrap(),
            PipelineConfig::strict()
        );
    }

    #[test]
    fn test_loaded_config_without_preset() {
        let loaded = PipelineConfig {
            quorum: 2,
            ..Default::default()
        };
        let rendered = render_config(&ConfigArgs { preset: None }, loaded).unwrap();
        assert!(rendered.contains("quorum = 2"));
    }
}
