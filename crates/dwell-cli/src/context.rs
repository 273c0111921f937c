use anyhow::Context;
use dwell_config::{API_KEY_FALLBACK_VARS, DwellConfig};
use dwell_genai::GeminiClient;
use dwell_pipeline::Pipeline;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: DwellConfig,
    pub pipeline: Pipeline<GeminiClient>,
}

impl AppContext {
    /// Load configuration (including `.env`) and build the pipeline over the
    /// Gemini client.
    pub fn init() -> anyhow::Result<Self> {
        let config = DwellConfig::load_with_dotenv().context("failed to load configuration")?;
        warn_unconfigured(&config);

        let client =
            GeminiClient::new(&config.genai).context("failed to build the generative client")?;
        let pipeline = Pipeline::new(client, &config);
        Ok(Self { config, pipeline })
    }

    /// The requested style, or the configured default.
    pub fn style_or_default<'a>(&'a self, style: Option<&'a str>) -> &'a str {
        style
            .map(str::trim)
            .filter(|style| !style.is_empty())
            .unwrap_or(&self.config.studio.default_style)
    }
}

/// Emit warnings for a missing credential and likely mistyped env var keys.
pub fn warn_unconfigured(config: &DwellConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &DwellConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    if config.genai.is_configured() {
        return Vec::new();
    }

    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();
    let mut warnings = Vec::new();

    if has_env_prefix(&env_keys, "DWELL_GENAI") {
        warnings.push(
            "GenAI config appears default while DWELL_GENAI* env vars exist. Use double underscores (example: DWELL_GENAI__API_KEY)."
                .to_string(),
        );
    }

    warnings.push(format!(
        "No generative backend API key configured. Set DWELL_GENAI__API_KEY or {}; analyze, render, refine and materials will fail until one is set.",
        API_KEY_FALLBACK_VARS.join(" or ")
    ));

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
