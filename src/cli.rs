//! Interface de linha de comando do MoveMaster baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] e flags globais
//! (--role, --file, --verbose). Cada subcomando aplica uma única operação ao
//! snapshot do job e o grava de volta.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use movemaster::Role;
use movemaster::state_machine::RoutingDecision;

/// MoveMaster: fluxo de trabalho de mudanças com portões de custódia e pagamento.
#[derive(Debug, Parser)]
#[command(name = "movemaster", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Papel de quem executa a operação.
    #[arg(long, short, global = true, value_enum, default_value_t = RoleArg::Driver)]
    pub role: RoleArg,

    /// Caminho do snapshot JSON do job (sobrescreve `job_file` da configuração).
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Papel aceito pela CLI, mapeado para [`Role`] internamente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Motorista responsável pelo caminhão.
    Driver,
    /// Ajudante da equipe.
    Helper,
    /// Escritório central (hub).
    Office,
    /// Armazém de custódia.
    Warehouse,
    /// Cliente da mudança.
    Client,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Driver => Role::Driver,
            RoleArg::Helper => Role::Helper,
            RoleArg::Office => Role::Office,
            RoleArg::Warehouse => Role::Warehouse,
            RoleArg::Client => Role::Client,
        }
    }
}

/// Rota escolhida ao sair de IN_TRANSIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RouteArg {
    /// Passa pelo armazém antes do destino.
    Warehouse,
    /// Segue direto para o destino.
    Direct,
}

impl From<RouteArg> for RoutingDecision {
    fn from(arg: RouteArg) -> Self {
        match arg {
            RouteArg::Warehouse => RoutingDecision::Warehouse,
            RouteArg::Direct => RoutingDecision::Direct,
        }
    }
}

/// Qual assinatura do cliente registrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Leg {
    /// Conhecimento de embarque na origem.
    Origin,
    /// Recibo de entrega no destino.
    Delivery,
}

/// Qual parcela de pagamento o escritório libera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaymentLeg {
    /// Parcela da coleta.
    Pickup,
    /// Parcela da entrega (portão financeiro).
    Delivery,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Executa a demonstração completa do fluxo, com rota pelo armazém.
    Demo,

    /// Cria um novo job de exemplo e grava o snapshot.
    New {
        /// Sobrescreve um snapshot existente.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Mostra o painel de etapas e o estado dos portões.
    Status,

    /// Avança o job para a próxima etapa.
    Advance {
        /// Rota obrigatória ao sair de IN_TRANSIT.
        #[arg(long, value_enum)]
        route: Option<RouteArg>,
    },

    /// Registra a assinatura do cliente.
    Sign {
        #[arg(value_enum)]
        leg: Leg,
    },

    /// Registra um pagamento parcial.
    Pay {
        /// Valor positivo, por exemplo 500 ou 123.45.
        amount: Decimal,
    },

    /// Libera uma parcela de pagamento (somente escritório).
    ClearPayment {
        #[arg(value_enum)]
        leg: PaymentLeg,
    },

    /// Registra a chegada do motorista ao armazém.
    Arrive,

    /// Registra o aceite de custódia pelo armazém.
    Handshake,

    /// Agenda a data de saída do armazém (AAAA-MM-DD).
    Schedule { date: NaiveDate },

    /// Despacha a carga do armazém para o destino.
    Dispatch,

    /// Mostra o resumo da tarifa e o saldo devedor.
    Ledger,

    /// Mostra o demonstrativo de pagamento do papel atual.
    Payout,

    /// Lista o inventário agrupado por nome e condição.
    Items,

    /// Adiciona itens ao inventário.
    AddItems {
        name: String,
        /// Quantidade de itens idênticos.
        #[arg(long, short, default_value_t = 1)]
        quantity: u32,
        /// Condição do item; padrão "PBO (Packed by Owner)".
        #[arg(long, short)]
        condition: Option<String>,
    },

    /// Marca um grupo do inventário como verificado.
    VerifyGroup {
        /// Chave do grupo no formato `nome|condição`.
        key: String,
        /// Desmarca a verificação em vez de marcar.
        #[arg(long, default_value_t = false)]
        undo: bool,
    },

    /// Renomeia ou altera a condição de um grupo do inventário.
    EditGroup {
        /// Chave do grupo no formato `nome|condição`.
        key: String,
        name: String,
        condition: String,
    },

    /// Remove todos os itens de um grupo do inventário.
    DeleteGroup { key: String },

    /// Substitui os componentes da tarifa a partir de um arquivo JSON (somente escritório).
    ///
    /// Os pagamentos já registrados são preservados.
    Charges { file: PathBuf },

    /// Mostra o registro de auditoria do job.
    Audit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_advance_with_route() {
        let cli = Cli::parse_from(["movemaster", "--role", "office", "advance", "--route", "warehouse"]);
        assert_eq!(cli.role, RoleArg::Office);
        match cli.command {
            Command::Advance { route } => assert_eq!(route, Some(RouteArg::Warehouse)),
            _ => panic!("expected Advance command"),
        }
    }

    #[test]
    fn cli_defaults_to_driver() {
        let cli = Cli::parse_from(["movemaster", "status"]);
        assert_eq!(Role::from(cli.role), Role::Driver);
        assert!(cli.file.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn cli_parses_payment_amount() {
        let cli = Cli::parse_from(["movemaster", "pay", "123.45", "--file", "/tmp/j.json"]);
        match cli.command {
            Command::Pay { amount } => assert_eq!(amount, Decimal::new(12345, 2)),
            _ => panic!("expected Pay command"),
        }
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/j.json")));
    }

    #[test]
    fn cli_parses_schedule_date() {
        let cli = Cli::parse_from(["movemaster", "-r", "office", "schedule", "2025-07-05"]);
        match cli.command {
            Command::Schedule { date } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 7, 5).unwrap())
            }
            _ => panic!("expected Schedule command"),
        }
    }

    #[test]
    fn cli_parses_add_items() {
        let cli = Cli::parse_from(["movemaster", "add-items", "Box", "-q", "4"]);
        match cli.command {
            Command::AddItems {
                name,
                quantity,
                condition,
            } => {
                assert_eq!(name, "Box");
                assert_eq!(quantity, 4);
                assert!(condition.is_none());
            }
            _ => panic!("expected AddItems command"),
        }
    }

    #[test]
    fn cli_parses_edit_group() {
        let cli = Cli::parse_from([
            "movemaster",
            "edit-group",
            "box|pbo (packed by owner)",
            "Book Box",
            "Taped",
        ]);
        match cli.command {
            Command::EditGroup { key, name, condition } => {
                assert_eq!(key, "box|pbo (packed by owner)");
                assert_eq!(name, "Book Box");
                assert_eq!(condition, "Taped");
            }
            _ => panic!("expected EditGroup command"),
        }
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
