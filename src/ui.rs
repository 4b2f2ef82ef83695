//! Interface de terminal do MoveMaster: painel de etapas e saída colorida.
//!
//! Usa `console` para estilização com cores e `indicatif` para a barra de
//! progresso da demonstração. O [`Board`] reúne os estilos e imprime o
//! painel de portões, o resumo da tarifa e os demonstrativos de pagamento.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;

use movemaster::custody::CustodyStage;
use movemaster::inventory::InventoryGroup;
use movemaster::ledger::{LedgerTotals, Payout};
use movemaster::permission::Role;
use movemaster::state_machine::{AuditRecord, BoardStep, Job, JobStatus, StepState};

/// Estilos compartilhados por toda a saída de terminal.
pub struct Board {
    green: Style,
    red: Style,
    yellow: Style,
    dim: Style,
    bold: Style,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
            bold: Style::new().bold(),
        }
    }
}

// Formata valores monetários com duas casas decimais.
fn money(value: Decimal) -> String {
    format!("${:.2}", value.round_dp(2))
}

impl Board {
    /// Imprime o painel das quatorze etapas com o estado de cada portão.
    pub fn print_status(&self, job: &Job, role: Role, steps: &[BoardStep], stage: CustodyStage) {
        println!(
            "{} {}  {}",
            self.bold.apply_to(&job.id),
            self.dim.apply_to(format!(
                "{} → {}",
                job.origin.city_state_zip, job.destination.city_state_zip
            )),
            self.yellow.apply_to(format!("viewing as {role}"))
        );
        println!();

        for step in steps {
            let marker = match step.state {
                StepState::Done => self.green.apply_to("✓"),
                StepState::Current => self.yellow.apply_to("▶"),
                StepState::Upcoming => self.dim.apply_to("·"),
            };

            let mut notes = Vec::new();
            if step.locked_for_role {
                notes.push(self.red.apply_to(format!("locked for {role}")).to_string());
            }
            if let Some(condition) = step.blocked {
                notes.push(self.red.apply_to(format!("blocked: {condition}")).to_string());
            } else if step.gated && step.state != StepState::Done {
                notes.push(self.dim.apply_to("gate").to_string());
            }

            let line = format!(
                "{:>2}. {:<10} {:<20}",
                step.status.index() + 1,
                step.label,
                step.status.to_string()
            );
            let line = if step.state == StepState::Current {
                self.bold.apply_to(line).to_string()
            } else {
                line
            };
            println!("  {marker} {line} {}", notes.join("  "));
        }

        println!();
        println!(
            "  custody: {}  stage: {}  signatures: {}/{}  payments: pickup {} delivery {}",
            self.bold.apply_to(job.custody_holder),
            stage,
            u8::from(job.origin_signed),
            u8::from(job.delivery_signed),
            self.flag(job.pickup_paid),
            self.flag(job.delivery_paid),
        );
        println!(
            "  valuation: {}  helpers: {}",
            job.valuation_option,
            if job.assigned_helpers.is_empty() {
                "-".to_string()
            } else {
                job.assigned_helpers.join(", ")
            }
        );
        if let Some(date) = job.storage_entry_date {
            println!("  in storage since: {date}");
        }
        if let Some(date) = job.outbound_scheduled_date {
            println!("  outbound scheduled: {date}");
        }
        if let Some(condition) = job.blocking_condition() {
            println!("  {} {}", self.red.apply_to("⛔"), condition.reason());
        }
    }

    fn flag(&self, on: bool) -> String {
        if on {
            self.green.apply_to("✓").to_string()
        } else {
            self.dim.apply_to("✗").to_string()
        }
    }

    /// Mensagem curta após uma operação aceita.
    pub fn committed(&self, what: &str, job: &Job) {
        println!(
            "  {} {what} ({} · custody {})",
            self.green.apply_to("✓"),
            job.status,
            job.custody_holder
        );
    }

    /// Mensagem de rejeição com o motivo retornado pelo fluxo.
    pub fn rejected(&self, reason: &str) {
        eprintln!("  {} {reason}", self.red.apply_to("✗"));
    }

    pub fn print_ledger(&self, totals: &LedgerTotals) {
        println!("{}", self.bold.apply_to("─── Tariff Summary ───"));
        let rows = [
            ("Weight", totals.weight_total),
            ("Cubic", totals.cubic_total),
            ("Hourly", totals.hourly_total),
            ("Packing", totals.packing_total),
            ("Other services", totals.other_total),
            ("Storage", totals.storage_total),
        ];
        for (label, value) in rows {
            println!("  {label:<16} {:>12}", money(value));
        }
        println!("  {:<16} {:>12}", "Grand total", self.bold.apply_to(money(totals.grand_total)));
        println!("  {:<16} {:>12}", "Paid", money(totals.total_paid));
        let balance = if totals.is_settled() {
            self.green.apply_to(money(totals.balance_due))
        } else {
            self.red.apply_to(money(totals.balance_due))
        };
        println!("  {:<16} {:>12}", "Balance due", balance);
        if totals.overage_cu_ft > 0 {
            println!(
                "  {}",
                self.yellow.apply_to(format!(
                    "Overage {} cu ft ({})",
                    totals.overage_cu_ft,
                    money(totals.overage_revenue)
                ))
            );
        }
    }

    pub fn print_payout(&self, payout: &Payout) {
        println!("{}", self.bold.apply_to(format!("─── {} Settlement ───", payout.role)));
        for line in &payout.lines {
            println!("  {:<16} {:>10}", line.label, money(line.amount));
        }
        println!("  {:<16} {:>10}", "Gross", self.bold.apply_to(money(payout.gross)));
        println!("  {:<16} {:>10}", "Tax reserve", self.yellow.apply_to(money(payout.tax_reserve)));
        println!("  {:<16} {:>10}", "Projected net", self.green.apply_to(money(payout.projected_net)));
    }

    pub fn print_inventory(&self, groups: &[InventoryGroup]) {
        if groups.is_empty() {
            println!("  {}", self.dim.apply_to("no inventory recorded"));
            return;
        }
        for g in groups {
            let check = if g.is_fully_verified() {
                self.green.apply_to("✓")
            } else {
                self.dim.apply_to("·")
            };
            println!(
                "  {check} {:>3} × {:<24} {:<28} {}",
                g.quantity(),
                g.name,
                g.condition,
                self.dim.apply_to(&g.key)
            );
        }
    }

    /// Imprime o registro de auditoria formatado em JSON com estilo colorido.
    pub fn print_audit(&self, record: &AuditRecord) {
        let style = if record.status == JobStatus::Completed {
            &self.green
        } else {
            &self.yellow
        };
        println!();
        println!("{}", style.apply_to("─── Audit Record ───"));
        println!("{}", serde_json::to_string_pretty(record).unwrap_or_default());
    }
}

/// Barra de progresso das quatorze etapas usada pela demonstração.
pub struct DemoProgress {
    pb: ProgressBar,
    yellow: Style,
}

impl DemoProgress {
    pub fn start() -> Self {
        let pb = ProgressBar::new(JobStatus::Completed.index() as u64);
        let style = ProgressStyle::default_bar()
            .template("{bar:28.cyan/blue} {pos:>2}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        Self {
            pb,
            yellow: Style::new().yellow(),
        }
    }

    /// Atualiza a barra para refletir o estado atual do job.
    pub fn update(&self, job: &Job) {
        self.pb.set_position(job.status.index() as u64);
        self.pb.set_message(format!("{} ({})", job.status.label(), job.status));
    }

    /// Mostra uma rejeição esperada sem interromper a barra.
    pub fn note(&self, msg: &str) {
        self.pb.println(format!("  {} {msg}", self.yellow.apply_to("⛔")));
    }

    pub fn finish(&self) {
        self.pb.finish_with_message("Done");
    }
}
