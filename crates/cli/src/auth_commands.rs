use {
    anyhow::Result,
    clap::Subcommand,
    gembox_accounts::FsAccountDirectory,
    gembox_oauth::{
        ProviderConfig, SourceResolver, TokenLifecycle, gemini_config, mask_token, now_unix_ms,
    },
    secrecy::ExposeSecret,
};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Show credential status for the Gemini provider.
    Status,
    /// Print a valid access token, refreshing it first if needed.
    Token,
    /// Force a refresh exchange now.
    Refresh,
}

pub async fn handle_auth(action: AuthAction) -> Result<()> {
    let cfg = gembox_config::discover_and_load();
    let provider = gemini_config(&cfg);
    let directory = FsAccountDirectory::from_config(&provider, &cfg);

    match action {
        AuthAction::Status => status(&provider, &directory),
        AuthAction::Token => token(&provider, &directory).await,
        AuthAction::Refresh => refresh(&provider, &directory).await,
    }
}

fn status(provider: &ProviderConfig, directory: &FsAccountDirectory) -> Result<()> {
    let Some(resolved) = SourceResolver::new(provider, directory).resolve() else {
        println!("No credentials found for {}.", provider.name);
        return Ok(());
    };

    let state = resolved.record.expiry.map_or("no expiry".to_string(), |expiry| {
        let now = now_unix_ms();
        if expiry > now {
            let remaining = (expiry - now) / 1000;
            let hours = remaining / 3600;
            let mins = (remaining % 3600) / 60;
            format!("valid ({hours}h {mins}m remaining)")
        } else {
            "expired".to_string()
        }
    });
    println!(
        "{} [{state}] {}",
        provider.name,
        resolved.source.path.display()
    );
    Ok(())
}

async fn token(provider: &ProviderConfig, directory: &FsAccountDirectory) -> Result<()> {
    let outcome = TokenLifecycle::new(provider, directory).ensure_valid().await?;
    if let Some(err) = &outcome.write_error {
        // The token below is still good; only persistence failed.
        eprintln!("warning: refreshed token could not be persisted: {err}");
    }
    println!("{}", outcome.credentials.access_token.expose_secret());
    Ok(())
}

async fn refresh(provider: &ProviderConfig, directory: &FsAccountDirectory) -> Result<()> {
    let outcome = TokenLifecycle::new(provider, directory).refresh_now().await?;
    println!(
        "Refreshed {} ({})",
        provider.name,
        mask_token(outcome.credentials.access_token.expose_secret())
    );
    if let Some(expiry) = outcome.credentials.expiry {
        let mins = (expiry - now_unix_ms()) / 60_000;
        println!("Expires in about {mins}m.");
    }
    if let Some(err) = outcome.write_error {
        eprintln!("warning: refreshed token could not be persisted: {err}");
    }
    Ok(())
}
