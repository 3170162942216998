//! Service credential management

use crate::cli::app::ServiceAction;
use crate::config::{GlobalConfig, Keychain, ServiceConfig, TokenSource};
use crate::github::GithubClient;
use crate::output::{
    OperationResult, OutputMode, ServiceInfoResult, ServiceListResult, ServiceRow, mask_token,
};

/// Dispatch a `nimbus service` action
pub fn service_cmd(action: ServiceAction, mode: OutputMode) -> anyhow::Result<()> {
    match action {
        ServiceAction::List => list(mode),
        ServiceAction::Info { name } => info(&name, mode),
        ServiceAction::Set { name, username, token, email, validate } => {
            set(&name, ServiceConfig { username, token, email }, validate, mode)
        }
    }
}

fn list(mode: OutputMode) -> anyhow::Result<()> {
    let keychain = Keychain::load();

    let mut rows = Vec::new();
    // github is always listed; a token from the environment counts as configured
    if !keychain.services().contains_key("github") {
        let configured = keychain.github_token().is_ok();
        rows.push(ServiceRow {
            name: "github".to_string(),
            configured,
            attributes: if configured { vec!["token".to_string()] } else { Vec::new() },
        });
    }
    for (name, service) in keychain.services() {
        rows.push(ServiceRow {
            name: name.clone(),
            configured: true,
            attributes: service.configured_attributes(),
        });
    }
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    ServiceListResult { services: rows }.render(mode);
    Ok(())
}

fn info(name: &str, mode: OutputMode) -> anyhow::Result<()> {
    let keychain = Keychain::load();
    let service = keychain.services().get(name).cloned().unwrap_or_default();

    let (token, token_source) = if name == "github" {
        match keychain.github_token() {
            Ok((token, source)) => (Some(mask_token(&token)), Some(source.as_str().to_string())),
            Err(_) => (None, None),
        }
    } else {
        (
            service.token.as_deref().map(mask_token),
            service.token.is_some().then(|| TokenSource::GlobalConfig.as_str().to_string()),
        )
    };

    let configured = token.is_some() || service.username.is_some() || service.email.is_some();
    ServiceInfoResult {
        name: name.to_string(),
        configured,
        username: service.username,
        email: service.email,
        token,
        token_source,
    }
    .render(mode);
    Ok(())
}

fn set(
    name: &str,
    update: ServiceConfig,
    validate: bool,
    mode: OutputMode,
) -> anyhow::Result<()> {
    if update.username.is_none() && update.token.is_none() && update.email.is_none() {
        anyhow::bail!("nothing to set; pass --username, --token, or --email");
    }

    let mut global = GlobalConfig::load();
    global.set_service(name, update);

    if validate && name == "github" {
        let keychain = Keychain::from_global(global.clone());
        let (token, _) = keychain.github_token()?;
        let user = GithubClient::new(&token)?.validate()?;
        println!("Authenticated to GitHub as {}", user.login);
    }

    global.save()?;
    OperationResult {
        success: true,
        message: format!("Service '{name}' updated."),
    }
    .render(mode);
    Ok(())
}
