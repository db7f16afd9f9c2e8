//! Command-line client for UniVote elections.

#[macro_use]
extern crate log;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use figment::providers::Serialized;

use univote_client::{
    admin::Admin,
    backend::HttpBackend,
    logging,
    model::{ElectionKind, VoteIntent},
    protocol::{hex, Address, AddressError},
    session::Session,
    vote::{vote_blocker, VoteSigningProtocol},
    wallet::RpcWallet,
    Config, Error, Result,
};

const PROGRAM_NAME: &str = "univote";

const ABOUT_TEXT: &str = "Browse UniVote elections, cast wallet-signed votes, and administer elections.

EXIT CODES:
     0: Success.
     1: Error.";

const API: &str = "API";
const WALLET: &str = "WALLET";
const AS: &str = "AS";
const ELECTION: &str = "ELECTION";
const CANDIDATE: &str = "CANDIDATE";
const ADDRESS: &str = "ADDRESS";
const MATRIC: &str = "MATRIC";
const TITLE: &str = "TITLE";
const KIND: &str = "KIND";
const ALLOW: &str = "ALLOW";
const NAME: &str = "NAME";
const FORCE: &str = "FORCE";

/// Accept a wallet address in any letter case, keeping the text as given.
fn address_arg(text: &str) -> std::result::Result<String, AddressError> {
    text.parse::<Address>().map(|_| text.to_string())
}

fn election_arg() -> Arg {
    Arg::new(ELECTION)
        .help("Election ID")
        .value_parser(value_parser!(u64).range(1..))
        .required(true)
}

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .subcommand_required(true)
        .arg(
            Arg::new(API)
                .long("api")
                .value_name("URL")
                .help("Backend base URL; overrides `api_base_url`")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new(WALLET)
                .long("wallet")
                .value_name("URL")
                .help("Wallet JSON-RPC URL; overrides `wallet_rpc_url`")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new(AS)
                .long("address")
                .value_parser(address_arg)
                .value_name("ADDRESS")
                .help("Act as the user registered with this wallet address")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(Command::new("elections").about("List all elections"))
        .subcommand(
            Command::new("status")
                .about("Show whether an election has started or ended")
                .arg(election_arg()),
        )
        .subcommand(
            Command::new("candidates")
                .about("List an election's candidates")
                .arg(election_arg()),
        )
        .subcommand(
            Command::new("winner")
                .about("Show the winner of an ended election")
                .arg(election_arg()),
        )
        .subcommand(
            Command::new("voter")
                .about("Show whether a wallet has voted in an election")
                .arg(election_arg())
                .arg(
                    Arg::new(ADDRESS)
                        .help("Wallet address")
                        .value_parser(address_arg)
                        .required(true),
                ),
        )
        .subcommand(Command::new("sign-in").about("Connect the wallet and look up its user"))
        .subcommand(
            Command::new("register")
                .about("Connect the wallet and register it to a matric number")
                .arg(Arg::new(MATRIC).help("Matric number").required(true)),
        )
        .subcommand(
            Command::new("vote")
                .about("Sign and cast a vote as the `--address` user")
                .arg(election_arg())
                .arg(
                    Arg::new(CANDIDATE)
                        .help("Candidate ID")
                        .value_parser(value_parser!(u64).range(1..))
                        .required(true),
                )
                .arg(
                    Arg::new(FORCE)
                        .long("force")
                        .help("Skip the local already-voted and eligibility checks")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("digest")
                .about("Print the canonical vote message without contacting anything")
                .arg(election_arg())
                .arg(
                    Arg::new(CANDIDATE)
                        .help("Candidate ID")
                        .value_parser(value_parser!(u64).range(1..))
                        .required(true),
                )
                .arg(
                    Arg::new(ADDRESS)
                        .help("Voter wallet address")
                        .value_parser(address_arg)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("create-election")
                .about("Create an election (admin)")
                .arg(Arg::new(TITLE).help("Election title").required(true))
                .arg(
                    Arg::new(KIND)
                        .long("kind")
                        .help("Who may vote")
                        .value_parser(["general", "department", "program"])
                        .default_value("general"),
                )
                .arg(
                    Arg::new(ALLOW)
                        .long("allow")
                        .value_name("VALUE")
                        .help("Department or program allowed to vote; repeatable")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("add-candidate")
                .about("Add a candidate to an election (admin)")
                .arg(election_arg())
                .arg(Arg::new(NAME).help("Candidate name").required(true)),
        )
        .subcommand(
            Command::new("start")
                .about("Start an election (admin)")
                .arg(election_arg()),
        )
        .subcommand(
            Command::new("end")
                .about("End an election (admin)")
                .arg(election_arg()),
        )
}

/// Load the configuration, applying command-line overrides last.
fn load_config(args: &ArgMatches) -> Result<Config> {
    let mut figment = Config::figment();
    if let Some(url) = args.get_one::<String>(API) {
        figment = figment.merge(Serialized::default("api_base_url", url));
    }
    if let Some(url) = args.get_one::<String>(WALLET) {
        figment = figment.merge(Serialized::default("wallet_rpc_url", url));
    }
    Ok(figment.extract()?)
}

fn parse_address(text: &str) -> Result<Address> {
    text.parse()
        .map_err(|e| Error::BadRequest(format!("invalid address {text:?}: {e}")))
}

fn parse_kind(text: &str) -> ElectionKind {
    match text {
        "department" => ElectionKind::Department,
        "program" => ElectionKind::Program,
        _ => ElectionKind::General,
    }
}

/// The session of the `--address` user, or an anonymous one.
async fn session(args: &ArgMatches, backend: &HttpBackend) -> Result<Session> {
    match args.get_one::<String>(AS) {
        Some(text) => {
            let address = parse_address(text)?;
            let lookup = backend.user(text).await?;
            Session::from_lookup(&address, lookup)
        }
        None => Ok(Session::default()),
    }
}

/// The canonical message for a vote, described for humans.
fn digest_report(election_id: u64, candidate_id: u64, address: &str) -> Result<String> {
    let message = VoteIntent::new(election_id, candidate_id, address).message()?;
    Ok(format!(
        "voter:       {}\npacked:      {}\ndigest:      {}\nsigned hash: {}",
        message.voter,
        hex::encode(&message.packed()),
        message.digest(),
        message.signed_hash()
    ))
}

fn id(args: &ArgMatches, name: &str) -> u64 {
    *args.get_one::<u64>(name).unwrap() // Required argument is guaranteed to be present.
}

fn string<'a>(args: &'a ArgMatches, name: &str) -> &'a str {
    args.get_one::<String>(name).unwrap() // Required or defaulted.
}

/// Run the chosen subcommand.
async fn execute(args: &ArgMatches, config: &Config) -> Result<()> {
    let backend = HttpBackend::new(config)?;
    let wallet = || RpcWallet::from_config(config).map_err(|e| Error::WalletUnavailable(e.to_string()));

    match args.subcommand() {
        Some(("elections", _)) => {
            let session = session(args, &backend).await?;
            for election in backend.elections(session.address()).await? {
                println!("{election}");
            }
        }
        Some(("status", sub)) => {
            let session = session(args, &backend).await?;
            let status = backend.status(id(sub, ELECTION), session.address()).await?;
            println!(
                "started: {}\nended:   {}\nvoting:  {}",
                status.started,
                status.ended,
                if status.is_active() { "open" } else { "closed" }
            );
        }
        Some(("candidates", sub)) => {
            let session = session(args, &backend).await?;
            for candidate in backend.candidates(id(sub, ELECTION), session.address()).await? {
                println!("{candidate}");
            }
        }
        Some(("winner", sub)) => {
            let session = session(args, &backend).await?;
            let winner = backend.winner(id(sub, ELECTION), session.address()).await?;
            println!("{} with {} votes", winner.winner_name, winner.highest_votes);
        }
        Some(("voter", sub)) => {
            let session = session(args, &backend).await?;
            let info = backend
                .voter_info(id(sub, ELECTION), string(sub, ADDRESS), session.address())
                .await?;
            match (info.has_voted, info.voted_candidate_id) {
                (true, Some(candidate)) => println!("Voted for candidate {candidate}"),
                (true, None) => println!("Voted"),
                (false, _) => println!("Has not voted"),
            }
        }
        Some(("sign-in", _)) => {
            let wallet = wallet()?.ok_or_else(no_wallet)?;
            let session = Session::sign_in(&wallet, &backend).await?;
            print_user(&session);
        }
        Some(("register", sub)) => {
            let wallet = wallet()?.ok_or_else(no_wallet)?;
            let session = Session::register(&wallet, &backend, string(sub, MATRIC)).await?;
            print_user(&session);
        }
        Some(("vote", sub)) => {
            let session = session(args, &backend).await?;
            let voter = session
                .address()
                .ok_or_else(|| Error::Unauthorized("voting needs `--address <ADDRESS>`".to_string()))?;
            let intent = VoteIntent::new(id(sub, ELECTION), id(sub, CANDIDATE), voter);

            if !sub.get_flag(FORCE) {
                let election = backend
                    .elections(Some(voter))
                    .await?
                    .into_iter()
                    .find(|election| election.id == intent.election_id)
                    .ok_or_else(|| {
                        Error::BadRequest(format!("no election with ID {}", intent.election_id))
                    })?;
                let info = backend
                    .voter_info(intent.election_id, voter, Some(voter))
                    .await?;
                if let Some(blocker) = vote_blocker(&election, Some(&info), session.user()) {
                    return Err(Error::BadRequest(blocker.to_string()));
                }
            }

            let protocol = VoteSigningProtocol::new(wallet()?, backend);
            let result = protocol.prepare_and_submit_vote(&intent).await?;
            println!("{}\ntransaction: {}", result.message, result.tx_hash);
        }
        Some(("digest", sub)) => {
            println!(
                "{}",
                digest_report(id(sub, ELECTION), id(sub, CANDIDATE), string(sub, ADDRESS))?
            );
        }
        Some(("create-election", sub)) => {
            let session = session(args, &backend).await?;
            let allowed: Vec<String> = sub
                .get_many::<String>(ALLOW)
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            let created = Admin::new(&backend, &session)?
                .create_election(string(sub, TITLE), parse_kind(string(sub, KIND)), &allowed)
                .await?;
            println!("{}\ntransaction: {}", created.election, created.tx_hash);
        }
        Some(("add-candidate", sub)) => {
            let session = session(args, &backend).await?;
            let candidate = Admin::new(&backend, &session)?
                .add_candidate(id(sub, ELECTION), string(sub, NAME))
                .await?;
            println!("{candidate}");
        }
        Some(("start", sub)) => {
            let session = session(args, &backend).await?;
            let update = Admin::new(&backend, &session)?
                .start_election(id(sub, ELECTION))
                .await?;
            println!("{}\ntransaction: {}", update.message, update.tx_hash);
        }
        Some(("end", sub)) => {
            let session = session(args, &backend).await?;
            let update = Admin::new(&backend, &session)?
                .end_election(id(sub, ELECTION))
                .await?;
            println!("{}\ntransaction: {}", update.message, update.tx_hash);
        }
        _ => unreachable!("clap requires a known subcommand"),
    }
    Ok(())
}

fn no_wallet() -> Error {
    Error::WalletUnavailable("set `wallet_rpc_url` or pass `--wallet`".to_string())
}

fn print_user(session: &Session) {
    if let Some(user) = session.user() {
        println!(
            "{} ({}){}",
            user.matric_number,
            user.wallet_address,
            if user.is_admin { " [admin]" } else { "" }
        );
    }
}

/// Run the command, report the result, and return the exit code.
async fn run(args: &ArgMatches) -> u8 {
    let config = match load_config(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            return 1;
        }
    };
    if let Err(err) = logging::init(config.log_config(), config.http_trace()) {
        eprintln!("Logging disabled: {err}");
    }

    match execute(args, &config).await {
        Ok(()) => 0,
        Err(err) => {
            error!("{err}");
            eprintln!("Error: {err}");
            1
        }
    }
}

#[tokio::main]
async fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args).await;
    std::process::exit(exit_code.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_cli_usage() {
        let voter = "0xABCdef0000000000000000000000000000001234";
        let command_line = [PROGRAM_NAME, "vote", "3", "7", "--address", voter];
        let args = cli().try_get_matches_from(command_line).unwrap();
        let (name, sub) = args.subcommand().unwrap();
        assert_eq!(name, "vote");
        assert_eq!(id(sub, ELECTION), 3);
        assert_eq!(id(sub, CANDIDATE), 7);
        assert!(!sub.get_flag(FORCE));
        assert_eq!(args.get_one::<String>(AS).map(String::as_str), Some(voter));

        let command_line = [PROGRAM_NAME, "voter", "3", voter];
        let args = cli().try_get_matches_from(command_line).unwrap();
        let (_, sub) = args.subcommand().unwrap();
        assert_eq!(string(sub, ADDRESS), voter);

        let command_line = [
            PROGRAM_NAME,
            "create-election",
            "Class Rep",
            "--kind",
            "program",
            "--allow",
            "BSc Computer Science",
            "--allow",
            "BSc Management and Information Science",
        ];
        let args = cli().try_get_matches_from(command_line).unwrap();
        let (_, sub) = args.subcommand().unwrap();
        assert_eq!(parse_kind(string(sub, KIND)), ElectionKind::Program);
        assert_eq!(sub.get_many::<String>(ALLOW).unwrap().count(), 2);

        let command_line = [PROGRAM_NAME, "create-election", "SRC President"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        let (_, sub) = args.subcommand().unwrap();
        assert_eq!(parse_kind(string(sub, KIND)), ElectionKind::General);
    }

    #[test]
    fn bad_cli_usage() {
        // No subcommand.
        cli().try_get_matches_from([PROGRAM_NAME]).unwrap_err();

        // IDs must be positive integers.
        cli()
            .try_get_matches_from([PROGRAM_NAME, "status", "0"])
            .unwrap_err();
        cli()
            .try_get_matches_from([PROGRAM_NAME, "status", "three"])
            .unwrap_err();

        // Missing candidate.
        cli()
            .try_get_matches_from([PROGRAM_NAME, "vote", "3"])
            .unwrap_err();

        // Addresses are validated before they can reach a URL.
        cli()
            .try_get_matches_from([PROGRAM_NAME, "voter", "3", "../../admin/start"])
            .unwrap_err();
        cli()
            .try_get_matches_from([PROGRAM_NAME, "--address", "0xabc", "elections"])
            .unwrap_err();
        cli()
            .try_get_matches_from([PROGRAM_NAME, "digest", "3", "7", "0x12"])
            .unwrap_err();

        // Unknown election kind.
        cli()
            .try_get_matches_from([PROGRAM_NAME, "create-election", "X", "--kind", "faculty"])
            .unwrap_err();
    }

    #[test]
    fn digest_subcommand() {
        let report =
            digest_report(3, 7, "0xABCdef0000000000000000000000000000001234").unwrap();
        assert!(report.contains("voter:       0xABcDEf0000000000000000000000000000001234"));
        assert!(report.contains(
            "digest:      0x2b17e835b16dbb30d2eafbfc9603328830332377a9f05b67038408b5a04e9ece"
        ));
        assert!(report.contains(
            "signed hash: 0xde28b81ad1dc963232bcc64492692afa1f54f3832fb7f433aee4629ce2907046"
        ));

        assert!(matches!(
            digest_report(3, 7, "0x12"),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn command_line_overrides_configuration() {
        figment::Jail::expect_with(|_| {
            let command_line = [
                PROGRAM_NAME,
                "--api",
                "http://vote.test:8080",
                "--wallet",
                "http://127.0.0.1:1248",
                "elections",
            ];
            let args = cli().try_get_matches_from(command_line).unwrap();
            let config = load_config(&args).unwrap();
            assert_eq!(config.api_base_url(), "http://vote.test:8080");
            assert_eq!(config.wallet_rpc_url(), Some("http://127.0.0.1:1248"));
            Ok(())
        });
    }

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }
}
