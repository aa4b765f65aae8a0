// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Command line driver for the provider's resources and data sources.

use crate::config::Config;
use crate::constants::MANIFEST_SUFFIX;
use crate::error::ProviderError;
use crate::provider::{Provider, ProviderData};
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Manage custom resources with server-side apply
#[derive(Parser, Debug)]
#[command(name = "crd-provider")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every resource and data source type
    Types,
    /// Print the schema of a type as JSON
    Schema(TypeArgs),
    /// Read an existing object through its data source
    Read(ReadArgs),
    /// Render the YAML manifest of a desired object, without cluster access
    Render(FileArgs),
    /// Apply a new object and print its state
    Create(FileArgs),
    /// Apply changes to an existing object and print its state
    Update(FileArgs),
    /// Refresh a saved state from the cluster
    Refresh(FileArgs),
    /// Delete the object described by a saved state
    Delete(FileArgs),
    /// Print the state of an existing object from its `namespace/name` id
    Import(ImportArgs),
}

#[derive(Args, Debug)]
pub struct TypeArgs {
    /// Resource or data source type name
    pub type_name: String,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    pub type_name: String,
    #[arg(short, long)]
    pub namespace: String,
    #[arg(long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct FileArgs {
    pub type_name: String,
    /// YAML or JSON input, `-` for stdin
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    pub type_name: String,
    /// Import identifier, `namespace/name`
    pub id: String,
}

impl Cli {
    /// Run the command and print its output
    pub async fn run(self, config: Config) -> Result<()> {
        let output = self.execute(config).await?;
        if !output.is_empty() {
            println!("{}", output.trim_end());
        }
        Ok(())
    }

    /// Run the command and return what it would print
    pub async fn execute(self, config: Config) -> Result<String> {
        match self.command {
            Commands::Types => Ok(list_types()),
            Commands::Schema(args) => schema(&args.type_name),
            Commands::Read(args) => {
                let provider = connect(&config).await?;
                let data_source = provider.data_source(&args.type_name).map_err(report)?;
                let config = json!({"metadata": {"name": args.name, "namespace": args.namespace}});
                pretty(&data_source.read(config).await.map_err(report)?)
            }
            Commands::Render(args) => {
                let provider = Provider::with_data(ProviderData::from_config(&config, None));
                let data_source = provider
                    .data_source(&manifest_type(&args.type_name))
                    .map_err(report)?;
                let state = data_source.read(read_input(&args.file)?).await.map_err(report)?;
                state
                    .get("yaml")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("{} did not render a manifest", args.type_name))
            }
            Commands::Create(args) => {
                let provider = connect(&config).await?;
                let resource = provider.resource(&args.type_name).map_err(report)?;
                pretty(&resource.create(read_input(&args.file)?).await.map_err(report)?)
            }
            Commands::Update(args) => {
                let provider = connect(&config).await?;
                let resource = provider.resource(&args.type_name).map_err(report)?;
                pretty(&resource.update(read_input(&args.file)?).await.map_err(report)?)
            }
            Commands::Refresh(args) => {
                let provider = connect(&config).await?;
                let resource = provider.resource(&args.type_name).map_err(report)?;
                pretty(&resource.read(read_input(&args.file)?).await.map_err(report)?)
            }
            Commands::Delete(args) => {
                let provider = connect(&config).await?;
                let resource = provider.resource(&args.type_name).map_err(report)?;
                resource.delete(read_input(&args.file)?).await.map_err(report)?;
                Ok(String::new())
            }
            Commands::Import(args) => {
                let provider = Provider::with_data(ProviderData::from_config(&config, None));
                let resource = provider.resource(&args.type_name).map_err(report)?;
                pretty(&resource.import_state(&args.id).await.map_err(report)?)
            }
        }
    }
}

async fn connect(config: &Config) -> Result<Provider> {
    Provider::configure(config).await.map_err(report)
}

fn list_types() -> String {
    let resources = Provider::resources().into_iter().map(|r| format!("resource     {}", r.type_name()));
    let data_sources = Provider::data_sources()
        .into_iter()
        .map(|d| format!("data source  {}", d.type_name()));
    resources.chain(data_sources).collect::<Vec<_>>().join("\n")
}

fn schema(type_name: &str) -> Result<String> {
    let schema = Provider::resources()
        .into_iter()
        .find(|r| r.type_name() == type_name)
        .map(|r| r.schema())
        .or_else(|| {
            Provider::data_sources()
                .into_iter()
                .find(|d| d.type_name() == type_name)
                .map(|d| d.schema())
        })
        .ok_or_else(|| report(ProviderError::UnknownType(type_name.to_string())))?;
    Ok(serde_json::to_string_pretty(&schema)?)
}

fn manifest_type(type_name: &str) -> String {
    if type_name.ends_with(MANIFEST_SUFFIX) {
        type_name.to_string()
    } else {
        format!("{}{}", type_name, MANIFEST_SUFFIX)
    }
}

/// Parse a YAML or JSON document
fn read_input(path: &Path) -> Result<Value> {
    let raw = if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read stdin")?;
        raw
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    };
    debug!("Read {} bytes of input", raw.len());
    parse_input(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_input(raw: &str) -> Result<Value> {
    Ok(serde_yaml::from_str(raw)?)
}

fn pretty(state: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Print the diagnostics of `err` to stderr
fn report(err: ProviderError) -> anyhow::Error {
    for diagnostic in err.diagnostics().iter() {
        eprintln!("Error: {}", diagnostic);
    }
    anyhow::Error::new(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_read() {
        let cli = parse(&[
            "crd-provider",
            "read",
            "k8s_kms_services_k8s_aws_key_v1alpha1",
            "--namespace",
            "ns1",
            "--name",
            "k1",
        ]);

        match cli.command {
            Commands::Read(args) => {
                assert_eq!(args.namespace, "ns1");
                assert_eq!(args.name, "k1");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_requires_file() {
        assert!(Cli::try_parse_from(["crd-provider", "create", "k8s_kms_services_k8s_aws_key_v1alpha1"]).is_err());
    }

    #[test]
    fn test_parse_input_accepts_yaml_and_json() {
        let yaml = parse_input("metadata:\n  name: k1\n  namespace: ns1\n").unwrap();
        let json = parse_input(r#"{"metadata": {"name": "k1", "namespace": "ns1"}}"#).unwrap();

        assert_eq!(yaml, json);
        assert_eq!(yaml["metadata"]["name"], "k1");
    }

    #[test]
    fn test_manifest_type() {
        assert_eq!(
            manifest_type("k8s_kms_services_k8s_aws_key_v1alpha1"),
            "k8s_kms_services_k8s_aws_key_v1alpha1_manifest"
        );
        assert_eq!(
            manifest_type("k8s_kms_services_k8s_aws_key_v1alpha1_manifest"),
            "k8s_kms_services_k8s_aws_key_v1alpha1_manifest"
        );
    }

    #[test]
    fn test_list_types() {
        let types = list_types();
        assert_eq!(types.lines().count(), 12);
        assert!(types.contains("resource     k8s_kms_services_k8s_aws_grant_v1alpha1"));
        assert!(types.contains("data source  k8s_k8s_keycloak_org_keycloak_realm_import_v2alpha1_manifest"));
    }

    #[test]
    fn test_schema_output() {
        let output = schema("k8s_kms_services_k8s_aws_alias_v1alpha1").unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["attributes"]["id"]["computed"], true);
        assert!(schema("k8s_nope_v1").is_err());
    }

    #[tokio::test]
    async fn test_import_needs_no_cluster() {
        let cli = parse(&["crd-provider", "import", "k8s_kms_services_k8s_aws_key_v1alpha1", "ns1/k1"]);

        let output = cli.execute(Config::default()).await.unwrap();
        let state: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(state["id"], "ns1/k1");
        assert_eq!(state["metadata"]["namespace"], "ns1");
    }

    #[tokio::test]
    async fn test_render_from_file() {
        let path = std::env::temp_dir().join(format!("crd-provider-render-{}.yaml", std::process::id()));
        std::fs::write(
            &path,
            "metadata:\n  name: g1\n  namespace: ns1\nspec:\n  granteePrincipal: arn:aws:iam::123456789012:role/app\n  operations: [Decrypt]\n",
        )
        .unwrap();
        let cli = parse(&[
            "crd-provider",
            "render",
            "k8s_kms_services_k8s_aws_grant_v1alpha1",
            "-f",
            path.to_str().unwrap(),
        ]);

        let output = cli.execute(Config::default()).await.unwrap();
        std::fs::remove_file(&path).ok();

        assert!(output.starts_with("apiVersion: kms.services.k8s.aws/v1alpha1\nkind: Grant\n"));
        assert!(output.contains("- Decrypt"));
    }
}
