//! Build and deploy command templates.
//!
//! The per-kind template table is the only place invocation policy lives:
//! everything else treats commands as opaque [`CommandSpec`]s. Templates
//! are `minijinja` shell lines rendered with the descriptor's path, the
//! system id, and (for deploys) the target environment and optional pinned
//! version.

use crate::job::domain::CommandSpec;
use crate::system::domain::{SystemDescriptor, SystemKind};
use minijinja::{Environment, context};
use std::collections::HashMap;
use thiserror::Error;

/// Error returned when a command template fails to render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render {kind} command for system '{system_id}': {reason}")]
pub struct TemplateError {
    /// Which table the template came from (`build` or `deploy`).
    pub kind: &'static str,
    /// System the command was rendered for.
    pub system_id: String,
    /// Render failure description.
    pub reason: String,
}

/// Per-kind build and deploy command table.
#[derive(Debug, Clone, Default)]
pub struct CommandTemplates {
    build_overrides: HashMap<SystemKind, String>,
    deploy_overrides: HashMap<SystemKind, String>,
}

impl CommandTemplates {
    /// Creates the default command table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the build template for one kind.
    #[must_use]
    pub fn with_build_template(mut self, kind: SystemKind, template: impl Into<String>) -> Self {
        self.build_overrides.insert(kind, template.into());
        self
    }

    /// Overrides the deploy template for one kind.
    #[must_use]
    pub fn with_deploy_template(mut self, kind: SystemKind, template: impl Into<String>) -> Self {
        self.deploy_overrides.insert(kind, template.into());
        self
    }

    /// Renders the build command for a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when the template fails to render.
    pub fn build_command(&self, descriptor: &SystemDescriptor) -> Result<CommandSpec, TemplateError> {
        let template = self
            .build_overrides
            .get(&descriptor.kind())
            .map_or_else(|| default_build_template(descriptor.kind()), String::as_str);
        render(template, descriptor, None, None, "build")
    }

    /// Renders the deploy command for a descriptor.
    ///
    /// `version`, when set, pins the deploy to a prior version tag
    /// (rollback).
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when the template fails to render.
    pub fn deploy_command(
        &self,
        descriptor: &SystemDescriptor,
        environment: &str,
        version: Option<&str>,
    ) -> Result<CommandSpec, TemplateError> {
        let template = self
            .deploy_overrides
            .get(&descriptor.kind())
            .map_or_else(|| default_deploy_template(descriptor.kind()), String::as_str);
        render(template, descriptor, Some(environment), version, "deploy")
    }
}

const fn default_build_template(kind: SystemKind) -> &'static str {
    match kind {
        SystemKind::React | SystemKind::ReactBaas | SystemKind::FullStack => "npm run build",
        SystemKind::NodeService => "npm install && npm run build --if-present",
        SystemKind::Other => "npm run build --if-present",
    }
}

const fn default_deploy_template(kind: SystemKind) -> &'static str {
    match kind {
        SystemKind::React | SystemKind::ReactBaas | SystemKind::FullStack => {
            "npx firebase deploy --project {{ environment }}\
             {% if version %} --message rollback-{{ version }}{% endif %}"
        }
        SystemKind::NodeService => {
            "npm run deploy -- --env {{ environment }}\
             {% if version %} --version {{ version }}{% endif %}"
        }
        SystemKind::Other => {
            "npm run deploy --if-present -- --env {{ environment }}\
             {% if version %} --version {{ version }}{% endif %}"
        }
    }
}

fn render(
    template: &str,
    descriptor: &SystemDescriptor,
    environment: Option<&str>,
    version: Option<&str>,
    kind: &'static str,
) -> Result<CommandSpec, TemplateError> {
    let jinja = Environment::new();
    let line = jinja
        .render_str(
            template,
            context! {
                path => descriptor.path().as_str(),
                system_id => descriptor.id().as_str(),
                environment => environment,
                version => version,
            },
        )
        .map_err(|err| TemplateError {
            kind,
            system_id: descriptor.id().to_string(),
            reason: err.to_string(),
        })?;

    Ok(CommandSpec::shell(line, descriptor.path()))
}
