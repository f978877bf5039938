//! Instance commands: `odoo-panel instances list|create|action`.

use anyhow::{Context, Result, bail};
use console::style;

use super::CmdContext;
use odoo_panel::gates::GateDecision;
use odoo_panel::ui::{BusySpinner, render};
use panel_common::{
    InstanceAction, NewProductionInstance, OdooEdition, OdooVersion, ProductionFilter, SslMethod,
    apply_all_filters, production_names,
};

pub async fn cmd_instances_list(
    ctx: &CmdContext,
    filter: &str,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let client = ctx.authed_client()?;
    let instances = ctx.checked(client.list_instances().await, "Failed to list instances")?;

    let filter: ProductionFilter = filter.parse().unwrap_or_default();
    let shown = apply_all_filters(&instances, filter.as_key(), search.unwrap_or(""));

    if json {
        let body = serde_json::json!({
            "production": shown.production,
            "development": shown.development,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    print!("{}", render::instances(&shown));

    if let ProductionFilter::Named(name) = &filter {
        let known = production_names(&instances);
        if !known.contains(&name.as_str()) {
            println!();
            println!(
                "{} is not a production instance. Known: {}",
                style(name).yellow(),
                known.join(", ")
            );
        }
    }
    Ok(())
}

pub async fn cmd_instances_create(
    ctx: &CmdContext,
    name: &str,
    version: OdooVersion,
    edition: OdooEdition,
    ssl: SslMethod,
) -> Result<()> {
    let request = NewProductionInstance::new(name)
        .with_version(version)
        .with_edition(edition)
        .with_ssl_method(ssl);
    if !request.is_submittable() {
        bail!(
            "'{}' has no usable characters; use letters, digits and hyphens",
            name
        );
    }

    println!();
    println!("{}", style("New production instance").bold());
    println!("  Name:    {}", request.name);
    println!("  Domain:  {}", request.domain_preview(ctx.config.domain_suffix()));
    println!("  Version: Odoo {}", request.version.as_str());
    println!("  Edition: {}", request.edition.as_str());
    println!("  SSL:     {}", request.ssl_method);
    println!();

    if ctx.gate.confirm("Create this instance?")? == GateDecision::Rejected {
        println!("Cancelled.");
        return Ok(());
    }

    let client = ctx.authed_client()?;
    let spinner = BusySpinner::start("Create", format!("Creating {}...", request.name));
    match client.create_production_instance(&request).await {
        Ok(ack) => {
            spinner.finish_ok(
                ack.message
                    .unwrap_or_else(|| format!("Instance {} created", request.name)),
            );
            Ok(())
        }
        Err(e) => {
            spinner.finish_err(e.user_message("Failed to create the instance"));
            ctx.checked(Err(e), "Failed to create the instance")
        }
    }
}

pub async fn cmd_instances_action(
    ctx: &CmdContext,
    instance: &str,
    action: InstanceAction,
) -> Result<()> {
    if ctx.gate.check_action(action, instance)? == GateDecision::Rejected {
        println!("Cancelled.");
        return Ok(());
    }

    let client = ctx.authed_client()?;
    let spinner = BusySpinner::start(action.title(), format!("Running {} on {}...", action, instance));
    match client.run_instance_action(instance, action).await {
        Ok(ack) => {
            spinner.finish_ok(
                ack.message
                    .unwrap_or_else(|| format!("{} finished for {}", action.title(), instance)),
            );
            Ok(())
        }
        Err(e) => {
            spinner.finish_err(e.user_message(&format!("{} failed", action.title())));
            ctx.checked(Err(e), "Instance action failed")
                .with_context(|| format!("{} on {}", action, instance))
        }
    }
}
