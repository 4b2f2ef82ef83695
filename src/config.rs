//! Configuração do MoveMaster carregada a partir de `movemaster.toml`.
//!
//! A struct [`MoveConfig`] reúne as taxas de pagamento da equipe, a política
//! de liquidação e o caminho do snapshot do job. Valores ausentes no arquivo
//! usam defaults sensíveis. A variável de ambiente `MOVEMASTER_CONFIG` tem
//! precedência sobre o caminho padrão do arquivo.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::MoveError;
use crate::ledger::{PayoutRates, SettlementPolicy};

/// Nome do arquivo de configuração procurado no diretório atual.
pub const CONFIG_FILE: &str = "movemaster.toml";

/// Variável de ambiente que aponta para um arquivo de configuração alternativo.
pub const CONFIG_ENV: &str = "MOVEMASTER_CONFIG";

/// Configuração de nível superior carregada de `movemaster.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveConfig {
    /// Taxas de pagamento do motorista e do ajudante (tabela `[payout]`).
    #[serde(default)]
    pub payout: PayoutRates,

    /// Política aplicada na liberação do pagamento de entrega (tabela `[policy]`).
    #[serde(default)]
    pub policy: SettlementPolicy,

    /// Caminho do snapshot JSON do job.
    #[serde(default = "default_job_file")]
    pub job_file: PathBuf,
}

// Valor padrão para o snapshot: "job.json".
fn default_job_file() -> PathBuf {
    PathBuf::from("job.json")
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            payout: PayoutRates::default(),
            policy: SettlementPolicy::default(),
            job_file: default_job_file(),
        }
    }
}

impl MoveConfig {
    /// Carrega a configuração de `MOVEMASTER_CONFIG` ou de `movemaster.toml`.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self, MoveError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => {
                let path = Path::new(&path);
                if !path.exists() {
                    return Err(MoveError::Config(format!(
                        "{CONFIG_ENV} aponta para {}, que não existe",
                        path.display()
                    )));
                }
                Self::load_from(path)
            }
            _ => Self::load_from(Path::new(CONFIG_FILE)),
        }
    }

    /// Carrega a configuração de um caminho explícito.
    pub fn load_from(path: &Path) -> Result<Self, MoveError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str::<MoveConfig>(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), MoveError> {
        let rates = [
            ("payout.driver_commission_rate", self.payout.driver_commission_rate),
            ("payout.tax_reserve_rate", self.payout.tax_reserve_rate),
        ];
        for (name, rate) in rates {
            if rate.is_sign_negative() || rate > rust_decimal::Decimal::ONE {
                return Err(MoveError::Config(format!(
                    "{name} deve estar entre 0 e 1, recebido {rate}"
                )));
            }
        }
        Ok(())
    }
}
