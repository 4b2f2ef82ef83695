//! Async handle serializing concurrent requests against one [`JobDesk`].
//!
//! Requests are queued on an mpsc channel and applied one at a time by a
//! single task that owns the desk, so two callers can never both read the
//! pre-transition snapshot and both commit. Each request carries a oneshot
//! sender for its reply.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::desk::JobDesk;
use crate::error::MoveError;
use crate::ledger::{LedgerTotals, Payout};
use crate::permission::Role;
use crate::state_machine::{AuditRecord, Job, RoutingDecision};

type Task = Box<dyn FnOnce(&mut JobDesk) + Send>;

const QUEUE_DEPTH: usize = 64;

#[derive(Clone)]
pub struct JobHandle {
    tx: mpsc::Sender<Task>,
}

/// Spawn the owning task. The join handle yields the desk once every
/// [`JobHandle`] clone has been dropped.
pub fn spawn(desk: JobDesk) -> (JobHandle, JoinHandle<JobDesk>) {
    let (tx, mut rx) = mpsc::channel::<Task>(QUEUE_DEPTH);
    let task = tokio::spawn(async move {
        let mut desk = desk;
        while let Some(task) = rx.recv().await {
            task(&mut desk);
        }
        debug!(job_id = %desk.job().id, "job actor stopped");
        desk
    });
    (JobHandle { tx }, task)
}

impl JobHandle {
    /// Run `f` against the desk after every previously queued request.
    pub async fn call<R, F>(&self, f: F) -> Result<R, MoveError>
    where
        R: Send + 'static,
        F: FnOnce(&mut JobDesk) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let task: Task = Box::new(move |desk| {
            // The caller may have given up waiting; nothing to do then.
            let _ = reply_tx.send(f(desk));
        });
        self.tx
            .send(task)
            .await
            .map_err(|_| MoveError::ActorClosed)?;
        reply_rx.await.map_err(|_| MoveError::ActorClosed)
    }

    pub async fn get_job(&self) -> Result<Job, MoveError> {
        self.call(|desk| desk.job().clone()).await
    }

    pub async fn advance(
        &self,
        role: Role,
        routing: Option<RoutingDecision>,
    ) -> Result<Job, MoveError> {
        Ok(self.call(move |desk| desk.advance(role, routing)).await??)
    }

    pub async fn record_origin_signature(&self, role: Role) -> Result<Job, MoveError> {
        Ok(self
            .call(move |desk| desk.record_origin_signature(role))
            .await??)
    }

    pub async fn record_delivery_signature(&self, role: Role) -> Result<Job, MoveError> {
        Ok(self
            .call(move |desk| desk.record_delivery_signature(role))
            .await??)
    }

    pub async fn register_payment(&self, amount: Decimal) -> Result<Job, MoveError> {
        Ok(self
            .call(move |desk| desk.register_payment(amount))
            .await??)
    }

    pub async fn clear_pickup_payment(&self, role: Role) -> Result<Job, MoveError> {
        Ok(self
            .call(move |desk| desk.clear_pickup_payment(role))
            .await??)
    }

    pub async fn clear_delivery_payment(&self, role: Role) -> Result<Job, MoveError> {
        Ok(self
            .call(move |desk| desk.clear_delivery_payment(role))
            .await??)
    }

    pub async fn record_warehouse_arrival(&self, role: Role) -> Result<Job, MoveError> {
        Ok(self
            .call(move |desk| desk.record_warehouse_arrival(role))
            .await??)
    }

    pub async fn record_warehouse_handshake(&self, role: Role) -> Result<Job, MoveError> {
        Ok(self
            .call(move |desk| desk.record_warehouse_handshake(role))
            .await??)
    }

    pub async fn schedule_outbound(&self, date: NaiveDate) -> Result<Job, MoveError> {
        Ok(self
            .call(move |desk| desk.schedule_outbound(date))
            .await??)
    }

    pub async fn dispatch_from_warehouse(&self, role: Role) -> Result<Job, MoveError> {
        Ok(self
            .call(move |desk| desk.dispatch_from_warehouse(role))
            .await??)
    }

    pub async fn ledger_totals(&self) -> Result<LedgerTotals, MoveError> {
        Ok(self.call(|desk| desk.ledger_totals()).await??)
    }

    pub async fn payout(&self, role: Role) -> Result<Option<Payout>, MoveError> {
        Ok(self.call(move |desk| desk.payout(role)).await??)
    }

    pub async fn audit(&self) -> Result<AuditRecord, MoveError> {
        self.call(|desk| desk.audit()).await
    }
}
