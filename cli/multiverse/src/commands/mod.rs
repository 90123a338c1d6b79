mod browse;
mod characters;
mod config;
mod episodes;
mod home;
mod list;
mod locations;
mod open;

use std::fmt;

use anyhow::Result;
use bpaf::Bpaf;
use indoc::indoc;
use multiverse_catalog::CatalogClient;
use tracing::debug;

use crate::config::Config;
use crate::utils::init::init_catalog_client;

static MULTIVERSE_DESCRIPTION: &'_ str = indoc! {"
    Browse the characters, episodes and locations of the multiverse.\n\n

    Every page of the catalog is available as a command,
    'multiverse browse' searches a collection as you type."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, descr(MULTIVERSE_DESCRIPTION))]
pub struct MultiverseCli(#[bpaf(external(multiverse_args))] pub MultiverseArgs);

/// Main multiverse args parser
///
/// To parse the command line, use [`MultiverseCli`] via [`multiverse_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)] // we don't want this struct to be interpreted as a group
pub struct MultiverseArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    #[bpaf(external(commands), optional)]
    command: Option<Commands>,
}

impl MultiverseArgs {
    pub async fn handle(self, config: Config) -> Result<()> {
        let command = self.command.unwrap_or_default();
        debug!(?command, "running command");

        match command {
            // does not talk to the catalog
            Commands::Config(args) => args.handle(&config),
            command => {
                let client = init_catalog_client(&config)?;
                command.handle(config, client).await
            },
        }
    }
}

#[derive(Bpaf, Clone)]
enum Commands {
    /// Show the size of every collection
    #[bpaf(command)]
    Home(#[bpaf(external(home::home))] home::Home),

    /// List characters, optionally filtered
    #[bpaf(command)]
    Characters(#[bpaf(external(characters::characters))] characters::Characters),

    /// Show a character and the episodes it appears in
    #[bpaf(command)]
    Character(#[bpaf(external(characters::character))] characters::Character),

    /// List episodes, optionally filtered
    #[bpaf(command)]
    Episodes(#[bpaf(external(episodes::episodes))] episodes::Episodes),

    /// Show an episode and its characters
    #[bpaf(command)]
    Episode(#[bpaf(external(episodes::episode))] episodes::Episode),

    /// List locations, optionally filtered
    #[bpaf(command)]
    Locations(#[bpaf(external(locations::locations))] locations::Locations),

    /// Show a location and its residents
    #[bpaf(command)]
    Location(#[bpaf(external(locations::location))] locations::Location),

    /// Show the page at a path such as '/episodes/28'
    #[bpaf(command)]
    Open(#[bpaf(external(open::open))] open::Open),

    /// Search a collection interactively
    #[bpaf(command)]
    Browse(#[bpaf(external(browse::browse))] browse::Browse),

    /// Print the effective configuration
    #[bpaf(command)]
    Config(#[bpaf(external(config::config_args))] config::ConfigArgs),
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Home(home::Home::default())
    }
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Commands::Home(_) => "home",
            Commands::Characters(_) => "characters",
            Commands::Character(_) => "character",
            Commands::Episodes(_) => "episodes",
            Commands::Episode(_) => "episode",
            Commands::Locations(_) => "locations",
            Commands::Location(_) => "location",
            Commands::Open(_) => "open",
            Commands::Browse(_) => "browse",
            Commands::Config(_) => "config",
        };
        write!(f, "{name}")
    }
}

impl Commands {
    async fn handle(self, config: Config, client: CatalogClient) -> Result<()> {
        match self {
            Commands::Home(args) => args.handle(&client).await?,
            Commands::Characters(args) => args.handle(&client).await?,
            Commands::Character(args) => args.handle(&client).await?,
            Commands::Episodes(args) => args.handle(&client).await?,
            Commands::Episode(args) => args.handle(&client).await?,
            Commands::Locations(args) => args.handle(&client).await?,
            Commands::Location(args) => args.handle(&client).await?,
            Commands::Open(args) => args.handle(&client).await?,
            Commands::Browse(args) => args.handle(&config, &client).await?,
            Commands::Config(args) => args.handle(&config)?,
        }
        Ok(())
    }
}
