use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::protocol::PreferenceSnapshot;
use storage::{PreferenceStore, SqlitePreferenceStore};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://player.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stored cellular data preference.
    Show,
    AlwaysAllow,
    NeverAllow,
    /// Forget the stored choice so the dialog is shown again.
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let store = SqlitePreferenceStore::new(&cli.database_url).await?;

    match cli.command {
        Command::Show => match store.load_record().await? {
            Some(record) => {
                print_snapshot(record.snapshot);
                println!("updated_at={}", record.updated_at.to_rfc3339());
            }
            None => {
                print_snapshot(PreferenceSnapshot::default());
                println!("updated_at=never");
            }
        },
        Command::AlwaysAllow => {
            store.persist_always_allow_cellular().await?;
            print_snapshot(store.load().await?);
        }
        Command::NeverAllow => {
            store.persist_never_allow_cellular().await?;
            print_snapshot(store.load().await?);
        }
        Command::Reset => {
            store.reset().await?;
            println!("cleared cellular data preference");
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: PreferenceSnapshot) {
    println!(
        "dialog_suppressed={} cellular_data_allowed={}",
        snapshot.dialog_suppressed, snapshot.cellular_data_allowed
    );
}
