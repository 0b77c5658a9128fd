//! Engine profile: which columns play which role in the fixed queries.
//!
//! Defaults describe the Brasileirão player-match exports. A YAML file can
//! override any subset of keys:
//!
//! ```yaml
//! entity_field: jogador
//! top_n: 5
//! card_metrics: [cartao_amarelo]
//! ```

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub team_field: String,
    pub date_field: String,
    pub entity_field: String,
    /// Fields coerced to numbers right after unification.
    pub numeric_fields: Vec<String>,
    pub performance_metrics: Vec<String>,
    pub card_metrics: Vec<String>,
    /// Column whose value distribution is reported.
    pub card_distribution_field: String,
    pub results_columns: Vec<String>,
    pub top_n: usize,
}

const PERFORMANCE_METRICS: &[&str] = &[
    "chutes",
    "chutes_no_alvo",
    "posse_de_bola",
    "passes",
    "precisao_passes",
    "faltas",
    "cartao_amarelo",
    "cartao_vermelho",
    "impedimentos",
    "escanteios",
];

const CARD_METRICS: &[&str] = &["cartao_amarelo", "cartao_vermelho"];

const RESULTS_COLUMNS: &[&str] = &[
    "partida_id",
    "rodata",
    "clube",
    "cartao_amarelo",
    "atleta",
    "num_camisa",
    "posicao",
    "minuto",
];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl Default for Profile {
    fn default() -> Self {
        let mut numeric_fields = owned(CARD_METRICS);
        numeric_fields.extend(
            PERFORMANCE_METRICS
                .iter()
                .filter(|name| !CARD_METRICS.contains(*name))
                .map(|name| name.to_string()),
        );
        Self {
            team_field: "clube".to_string(),
            date_field: "rodata".to_string(),
            entity_field: "atleta".to_string(),
            numeric_fields,
            performance_metrics: owned(PERFORMANCE_METRICS),
            card_metrics: owned(CARD_METRICS),
            card_distribution_field: "cartao_amarelo".to_string(),
            results_columns: owned(RESULTS_COLUMNS),
            top_n: 10,
        }
    }
}

impl Profile {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening profile {path:?}"))?;
        let profile: Profile = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing profile {path:?}"))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.entity_field.trim().is_empty(), "entity_field cannot be empty");
        ensure!(!self.team_field.trim().is_empty(), "team_field cannot be empty");
        ensure!(!self.date_field.trim().is_empty(), "date_field cannot be empty");
        ensure!(self.top_n > 0, "top_n must be positive");
        Ok(())
    }
}
