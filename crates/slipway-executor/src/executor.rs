//! The deployment orchestrator.
//!
//! `Executor` validates each incoming envelope, dispatches to the handler
//! for its command kind, issues platform calls strictly in the order the
//! algorithms specify, and converts any failure into a FAILURE response at
//! exactly one place. It holds no state between commands; running many
//! executors concurrently on disjoint commands is safe.

use tracing::{error, info, warn};

use slipway_core::{
    Command, CommandEnvelope, ExecutionResponse, ResponsePayload, RetentionPolicy, SlipwayConfig,
};
use slipway_platform::{LogSink, PlatformClient, SecretsProvider};

use crate::error::{ExecutorError, ExecutorResult};
use crate::plugin::PluginRunner;
use crate::{deploy, discovery, plugin, routes, setup};

pub struct Executor<C, S, L, P> {
    client: C,
    secrets: S,
    log: L,
    runner: P,
    config: SlipwayConfig,
}

impl<C, S, L, P> Executor<C, S, L, P>
where
    C: PlatformClient,
    S: SecretsProvider,
    L: LogSink,
    P: PluginRunner,
{
    pub fn new(client: C, secrets: S, log: L, runner: P, config: SlipwayConfig) -> Self {
        Self {
            client,
            secrets,
            log,
            runner,
            config,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Execute one command. Never fails: every outcome, including payload
    /// validation and platform errors, comes back as a response.
    pub async fn execute(&self, envelope: &CommandEnvelope) -> ExecutionResponse {
        let command = match envelope.decode() {
            Ok(command) => command,
            Err(e) => {
                warn!(kind = ?envelope.kind, error = %e, "command rejected");
                return ExecutionResponse::failure(
                    ExecutorError::InvalidArgument(e.to_string()).to_string(),
                );
            }
        };

        // Credentials are decrypted once, before the first platform call.
        if let Some(sealed) = &envelope.credentials {
            if let Err(e) = self.secrets.decrypt(sealed) {
                error!(error = %e, "secret decryption failed");
                return ExecutionResponse::failure(e.to_string());
            }
            self.log.append("credentials decrypted");
        }

        let timeout_minutes = envelope
            .timeout_minutes
            .unwrap_or(self.config.defaults.call_timeout_minutes);

        info!(kind = ?command.kind(), timeout_minutes, "executing command");
        match self.dispatch(&command, timeout_minutes).await {
            Ok((output, payload)) => ExecutionResponse::success(output, payload),
            Err(e) => {
                error!(kind = ?command.kind(), error = %e, "command failed");
                self.log.append(&format!("command failed: {e}"));
                ExecutionResponse::failure(e.to_string())
            }
        }
    }

    async fn dispatch(
        &self,
        command: &Command,
        timeout_minutes: u64,
    ) -> ExecutorResult<(String, ResponsePayload)> {
        match command {
            Command::Setup(p) => {
                let policy = p.retention.unwrap_or(RetentionPolicy::new(
                    self.config.defaults.older_active_versions_to_keep,
                ));
                setup::run(&self.client, &self.log, p, policy, timeout_minutes).await
            }
            Command::Deploy(p) => {
                let strategy = p.strategy.unwrap_or(self.config.defaults.resize_strategy);
                deploy::deploy(&self.client, &self.log, p, strategy, timeout_minutes).await
            }
            Command::Rollback(p) => {
                let strategy = p.strategy.unwrap_or(self.config.defaults.resize_strategy);
                deploy::rollback(&self.client, &self.log, p, strategy, timeout_minutes).await
            }
            Command::RouteUpdate(p) => {
                routes::run(&self.client, &self.log, p, timeout_minutes).await
            }
            Command::ResourceDiscovery(p) => {
                discovery::discover(&self.client, p, timeout_minutes).await
            }
            Command::InstanceSync(p) => {
                discovery::instance_sync(&self.client, p, timeout_minutes).await
            }
            Command::RunPlugin(p) => plugin::run(&self.runner, &self.log, p),
        }
    }
}
