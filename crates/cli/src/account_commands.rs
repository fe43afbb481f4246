use {
    anyhow::Result,
    clap::Subcommand,
    gembox_accounts::FsAccountDirectory,
    gembox_oauth::{AccountDirectory, gemini_config},
};

#[derive(Subcommand)]
pub enum AccountsAction {
    /// List accounts in the managed store.
    List,
}

pub fn handle_accounts(action: AccountsAction) -> Result<()> {
    match action {
        AccountsAction::List => list(),
    }
}

fn list() -> Result<()> {
    let cfg = gembox_config::discover_and_load();
    let provider = gemini_config(&cfg);
    let directory = FsAccountDirectory::from_config(&provider, &cfg);

    let accounts = directory.list_accounts();
    if accounts.is_empty() {
        println!("No managed accounts.");
        return Ok(());
    }

    let default = directory.default_account();
    for account in accounts {
        let marker = if default.as_ref().is_some_and(|d| d.name == account.name) {
            "*"
        } else {
            " "
        };
        let email = account.email.as_deref().unwrap_or("-");
        println!("{marker} {} <{email}> ({})", account.name, account.token_file);
    }
    Ok(())
}
