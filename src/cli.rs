// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Command line surface: argument parsing, dispatch to the actions and output rendering.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::chrono::Utc;
use serde::Serialize;

use crate::actions::{
    get_catalogs, get_operators, CatalogCreate, CatalogDelete, OperatorInstall, OperatorUninstall,
    OperatorUpdate,
};
use crate::config::Config;
use crate::constants::conditions;
use crate::error::Result;
use crate::kubernetes::create_client;
use crate::lifecycle::OpContext;
use crate::types::extension::UpgradeConstraintPolicy;
use crate::types::{ClusterCatalog, ClusterExtension, HasConditions};

/// Manage operators and catalogs installed through OLMv1
#[derive(Parser, Debug)]
#[command(name = "olmctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the kubeconfig file to use
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Overall time limit for the command, e.g. 90s or 5m
    #[arg(long, global = true, env = "OLMCTL_TIMEOUT", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a resource
    #[command(subcommand)]
    Install(InstallCommands),
    /// Update a resource
    #[command(subcommand)]
    Update(UpdateCommands),
    /// Create a resource
    #[command(subcommand)]
    Create(CreateCommands),
    /// Delete a resource
    #[command(subcommand)]
    Delete(DeleteCommands),
    /// Display one or many resources
    #[command(subcommand)]
    Get(GetCommands),
}

#[derive(Subcommand, Debug)]
pub enum InstallCommands {
    /// Install an operator
    Operator(InstallOperatorArgs),
}

#[derive(Subcommand, Debug)]
pub enum UpdateCommands {
    /// Update an operator
    Operator(UpdateOperatorArgs),
}

#[derive(Subcommand, Debug)]
pub enum CreateCommands {
    /// Create a catalog
    Catalog(CreateCatalogArgs),
}

#[derive(Subcommand, Debug)]
pub enum DeleteCommands {
    /// Delete an operator
    Operator(DeleteOperatorArgs),
    /// Delete one or all catalogs
    Catalog(DeleteCatalogArgs),
}

#[derive(Subcommand, Debug)]
pub enum GetCommands {
    /// Display one or many installed operators
    Operator(GetArgs),
    /// Display one or many catalogs
    Catalog(GetArgs),
}

#[derive(Args, Debug)]
pub struct InstallOperatorArgs {
    /// Package name of the operator to install
    pub package: String,

    /// Namespace to install the operator in
    #[arg(short, long)]
    pub namespace: String,

    /// Upgrade channels from which to resolve bundles
    #[arg(short, long, value_delimiter = ',')]
    pub channels: Vec<String>,

    /// Version (or version range) from which to resolve bundles
    #[arg(short, long)]
    pub version: Option<String>,

    /// Service account to use for the extension installation
    #[arg(short, long, default_value = "default")]
    pub service_account: String,

    /// Labels used to select the catalog, as key=value
    #[arg(short, long, value_delimiter = ',', value_parser = parse_label)]
    pub labels: Vec<(String, String)>,

    /// Create a cluster role binding of the service account to cluster-admin
    #[arg(short = 'u', long)]
    pub unsafe_create_cluster_role_binding: bool,

    /// Time allowed for cleanup after a failed install
    #[arg(short = 'd', long, default_value = "1m", value_parser = parse_duration)]
    pub cleanup_timeout: Duration,
}

#[derive(Args, Debug)]
pub struct UpdateOperatorArgs {
    /// Name of the operator to update
    pub name: String,

    /// Version (or version range) from which to resolve bundles
    #[arg(long)]
    pub version: Option<String>,

    /// Upgrade channels from which to resolve bundles
    #[arg(long, value_delimiter = ',')]
    pub channels: Option<Vec<String>>,

    /// Labels used to select the catalog, as key=value
    #[arg(long, value_delimiter = ',', value_parser = parse_label)]
    pub labels: Option<Vec<(String, String)>>,

    /// Policy for upgrades: CatalogProvided or SelfCertified
    #[arg(long)]
    pub upgrade_constraint_policy: Option<UpgradeConstraintPolicy>,

    /// Keep the current value of every setting not given on the command line
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub ignore_unset: bool,
}

#[derive(Args, Debug)]
pub struct CreateCatalogArgs {
    /// Name of the catalog
    pub name: String,

    /// Catalog image reference
    pub image: String,

    /// Priority of the catalog relative to others
    #[arg(short, long)]
    pub priority: Option<i32>,

    /// Labels to set on the catalog, as key=value
    #[arg(short, long, value_delimiter = ',', value_parser = parse_label)]
    pub labels: Vec<(String, String)>,

    /// Whether the catalog should serve content
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub available: bool,

    /// Minutes between checks of the image for new content
    #[arg(long)]
    pub poll_interval_minutes: Option<i32>,

    /// Time allowed for cleanup after a failed create
    #[arg(short = 'd', long, default_value = "1m", value_parser = parse_duration)]
    pub cleanup_timeout: Duration,
}

#[derive(Args, Debug)]
pub struct DeleteOperatorArgs {
    /// Name of the operator to delete
    pub name: String,
}

#[derive(Args, Debug)]
pub struct DeleteCatalogArgs {
    /// Name of the catalog to delete
    #[arg(conflicts_with = "all", required_unless_present = "all")]
    pub name: Option<String>,

    /// Delete all catalogs
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Name of the resource; all resources when omitted
    pub name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Yaml,
    Json,
}

impl Commands {
    /// Short description of the action, used when reporting a failure.
    pub fn action(&self) -> &'static str {
        match self {
            Commands::Install(InstallCommands::Operator(_)) => "install operator",
            Commands::Update(UpdateCommands::Operator(_)) => "update operator",
            Commands::Create(CreateCommands::Catalog(_)) => "create catalog",
            Commands::Delete(DeleteCommands::Operator(_)) => "delete operator",
            Commands::Delete(DeleteCommands::Catalog(_)) => "delete catalog",
            Commands::Get(GetCommands::Operator(_)) => "get operators",
            Commands::Get(GetCommands::Catalog(_)) => "get catalogs",
        }
    }
}

impl Cli {
    /// The context the command runs under: `parent`, bounded by `--timeout` when given.
    pub fn op_context(&self, parent: &OpContext) -> OpContext {
        match self.timeout {
            Some(timeout) => parent.with_timeout(timeout),
            None => parent.clone(),
        }
    }

    /// Run the command, returning what should be printed on success.
    pub async fn run(self, ctx: &OpContext, config: &Config) -> Result<String> {
        let client = create_client(self.kubeconfig.as_deref(), self.context.as_deref()).await?;

        match self.command {
            Commands::Install(InstallCommands::Operator(args)) => {
                let install = args.into_action();
                install.run(ctx, &client, config).await?;
                Ok(format!("operator {:?} created", install.package))
            }
            Commands::Update(UpdateCommands::Operator(args)) => {
                let update = args.into_action();
                update.run(ctx, &client, config).await?;
                Ok(format!("operator {:?} updated", update.package))
            }
            Commands::Create(CreateCommands::Catalog(args)) => {
                let create = args.into_action();
                create.run(ctx, &client, config).await?;
                Ok(format!("catalog {:?} created", create.name))
            }
            Commands::Delete(DeleteCommands::Operator(args)) => {
                OperatorUninstall::new(&args.name)
                    .run(ctx, &client, config)
                    .await?;
                Ok(format!("operator {:?} deleted", args.name))
            }
            Commands::Delete(DeleteCommands::Catalog(args)) => {
                let deleted = CatalogDelete {
                    name: args.name,
                    all: args.all,
                }
                .run(ctx, &client, config)
                .await?;
                Ok(deleted
                    .iter()
                    .map(|name| format!("catalog {:?} deleted", name))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Commands::Get(GetCommands::Operator(args)) => {
                let operators = get_operators(ctx, &client, args.name.as_deref()).await?;
                render(&operators, args.output, operator_table)
            }
            Commands::Get(GetCommands::Catalog(args)) => {
                let catalogs = get_catalogs(ctx, &client, args.name.as_deref()).await?;
                render(&catalogs, args.output, catalog_table)
            }
        }
    }
}

impl InstallOperatorArgs {
    fn into_action(self) -> OperatorInstall {
        let mut install = OperatorInstall::new(&self.package, &self.namespace);
        install.channels = self.channels;
        install.version = self.version;
        install.service_account = self.service_account;
        install.catalog_selector = self.labels.into_iter().collect();
        install.unsafe_create_cluster_role_binding = self.unsafe_create_cluster_role_binding;
        install.cleanup_timeout = self.cleanup_timeout;
        install
    }
}

impl UpdateOperatorArgs {
    fn into_action(self) -> OperatorUpdate {
        OperatorUpdate {
            package: self.name,
            version: self.version,
            channels: self.channels,
            selector: self.labels.map(|l| l.into_iter().collect::<BTreeMap<_, _>>()),
            upgrade_constraint_policy: self.upgrade_constraint_policy,
            ignore_unset: self.ignore_unset,
        }
    }
}

impl CreateCatalogArgs {
    fn into_action(self) -> CatalogCreate {
        let mut create = CatalogCreate::new(&self.name, &self.image);
        create.priority = self.priority;
        create.labels = self.labels.into_iter().collect();
        create.available = self.available;
        create.poll_interval_minutes = self.poll_interval_minutes;
        create.cleanup_timeout = self.cleanup_timeout;
        create
    }
}

/// Parse a duration such as `500ms`, `30s`, `1m30s` or `2h`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| format!("invalid duration {:?}", s))?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let out_of_range = || "duration out of range".to_string();
        let part = match unit {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.checked_mul(60).ok_or_else(out_of_range)?),
            "h" => Duration::from_secs(value.checked_mul(60 * 60).ok_or_else(out_of_range)?),
            "" => return Err(format!("missing unit in duration {:?}", s)),
            other => return Err(format!("unknown unit {:?} in duration {:?}", other, s)),
        };
        total = total.checked_add(part).ok_or_else(out_of_range)?;
    }
    Ok(total)
}

fn parse_label(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid label {:?}, expected key=value", s)),
    }
}

fn render<K: Serialize>(items: &[K], format: OutputFormat, table: fn(&[K]) -> String) -> Result<String> {
    if format == OutputFormat::Table {
        return Ok(table(items));
    }

    let value = match items {
        [single] => serde_json::to_value(single)?,
        _ => serde_json::json!({
            "apiVersion": "v1",
            "kind": "List",
            "items": items
                .iter()
                .map(serde_json::to_value)
                .collect::<std::result::Result<Vec<_>, _>>()?,
        }),
    };

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&value)?),
        _ => Ok(serde_yaml::to_string(&value)?.trim_end().to_string()),
    }
}

fn condition_status<K: HasConditions>(object: &K, condition_type: &str) -> String {
    object
        .find_condition(condition_type)
        .map_or_else(|| "Unknown".to_string(), |c| c.status.to_string())
}

fn age(created: Option<&Time>) -> String {
    let Some(created) = created else {
        return "<unknown>".to_string();
    };
    let secs = (Utc::now() - created.0).num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{}s", s),
        s if s < 60 * 60 => format!("{}m", s / 60),
        s if s < 24 * 60 * 60 => format!("{}h", s / (60 * 60)),
        s => format!("{}d", s / (24 * 60 * 60)),
    }
}

fn operator_table(operators: &[ClusterExtension]) -> String {
    let mut out = format!(
        "{:<30} {:<40} {:<12} {:<10} {:<12} {:<6}",
        "NAME", "INSTALLED BUNDLE", "VERSION", "INSTALLED", "PROGRESSING", "AGE"
    );
    for op in operators {
        let bundle = op.installed_bundle();
        out.push('\n');
        out.push_str(&format!(
            "{:<30} {:<40} {:<12} {:<10} {:<12} {:<6}",
            op.metadata.name.as_deref().unwrap_or_default(),
            bundle.map_or("-", |b| b.name.as_str()),
            bundle.map_or("-", |b| b.version.as_str()),
            condition_status(op, conditions::INSTALLED),
            condition_status(op, conditions::PROGRESSING),
            age(op.metadata.creation_timestamp.as_ref()),
        ));
    }
    out.trim_end().to_string()
}

fn catalog_table(catalogs: &[ClusterCatalog]) -> String {
    let mut out = format!(
        "{:<30} {:<12} {:<8} {:<8} {:<6}",
        "NAME", "AVAILABILITY", "PRIORITY", "SERVING", "AGE"
    );
    for catalog in catalogs {
        out.push('\n');
        out.push_str(&format!(
            "{:<30} {:<12} {:<8} {:<8} {:<6}",
            catalog.metadata.name.as_deref().unwrap_or_default(),
            if catalog.is_available() { "Available" } else { "Unavailable" },
            catalog.spec.priority.unwrap_or(0),
            condition_status(catalog, conditions::SERVING),
            age(catalog.metadata.creation_timestamp.as_ref()),
        ));
    }
    out.trim_end().to_string()
}
