use std::env;

use crate::api::ApiClient;
use crate::battle::{BattleEnvelope, RenderMode, TeamColor};
use crate::guild::{Brawl, Guild};
use crate::rewards::{ChestConfig, ChestTier};
use crate::server;

pub const USAGE: &str = "usage: fraywatch <battle|guild|brawl|chests|serve>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Battle,
    Guild,
    Brawl,
    Chests,
    Serve,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("battle") => Some(Command::Battle),
        Some("guild") => Some(Command::Guild),
        Some("brawl") => Some(Command::Brawl),
        Some("chests") => Some(Command::Chests),
        Some("serve") => Some(Command::Serve),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Battle) => handle_battle(args),
        Some(Command::Guild) => handle_guild(args),
        Some(Command::Brawl) => handle_brawl(args),
        Some(Command::Chests) => handle_chests(args),
        Some(Command::Serve) => handle_serve(),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_battle(args: &[String]) -> i32 {
    let Some(bqid) = args.get(2).filter(|a| !a.starts_with("--")) else {
        eprintln!(
            "usage: fraywatch battle <bqid> [--markdown] [--summary] [--stats] [--tracker <blue|red>] [--csv]"
        );
        return 2;
    };
    let mode = if args.iter().any(|a| a == "--markdown") {
        RenderMode::Markdown
    } else {
        RenderMode::Fixed
    };

    let client = match ApiClient::from_env() {
        Ok(client) => client,
        Err(err) => {
            eprintln!("could not build api client: {err}");
            return 1;
        }
    };
    let catalog = match client.card_catalog() {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("card catalog fetch failed: {err}");
            return 1;
        }
    };
    let envelope = match client.battle_envelope(bqid, &catalog) {
        Ok(envelope) => envelope,
        Err(err) => {
            eprintln!("battle parse failed: {err}");
            return 1;
        }
    };

    if args.iter().any(|a| a == "--summary") {
        println!("{}", envelope.markdown_summary());
        return 0;
    }
    if args.iter().any(|a| a == "--stats") {
        return print_team_stats(&envelope);
    }
    if let Some(flag_pos) = args.iter().position(|a| a == "--tracker") {
        let team = args.get(flag_pos + 1).map(String::as_str).unwrap_or("red");
        return print_tracker(&envelope, team);
    }
    if args.iter().any(|a| a == "--csv") {
        return print_tracker_csv(&envelope);
    }

    match envelope.log_text(mode) {
        Ok(text) => {
            println!("{text}");
            0
        }
        Err(err) => {
            eprintln!("log reconstruction failed: {err}");
            1
        }
    }
}

fn print_team_stats(envelope: &BattleEnvelope) -> i32 {
    let Some(battle) = envelope.battle() else {
        println!("{}", envelope.markdown_summary());
        return 0;
    };
    println!("##### {}'s team:", battle.player_1);
    println!("{}", battle.team_summary(TeamColor::Blue));
    println!("##### {}'s team:", battle.player_2);
    println!("{}", battle.team_summary(TeamColor::Red));
    0
}

fn print_tracker(envelope: &BattleEnvelope, team: &str) -> i32 {
    let Some(color) = TeamColor::from_label(team) else {
        eprintln!("invalid team '{team}', expected blue or red");
        return 2;
    };
    let Some(battle) = envelope.battle() else {
        println!("{}", envelope.markdown_summary());
        return 0;
    };
    match battle.log(RenderMode::Fixed) {
        Ok(log) => {
            println!("{}", log.tracker.markdown_table(battle.team(color), battle.names()));
            0
        }
        Err(err) => {
            eprintln!("log reconstruction failed: {err}");
            1
        }
    }
}

fn print_tracker_csv(envelope: &BattleEnvelope) -> i32 {
    let Some(battle) = envelope.battle() else {
        println!("{}", envelope.markdown_summary());
        return 0;
    };
    let log = match battle.log(RenderMode::Fixed) {
        Ok(log) => log,
        Err(err) => {
            eprintln!("log reconstruction failed: {err}");
            return 1;
        }
    };
    match log.tracker.csv_table(&[&battle.team1, &battle.team2], battle.names()) {
        Ok(csv) => {
            print!("{csv}");
            0
        }
        Err(err) => {
            eprintln!("csv export failed: {err}");
            1
        }
    }
}

fn handle_guild(args: &[String]) -> i32 {
    let Some(guild_id) = args.get(2) else {
        eprintln!("usage: fraywatch guild <guild_id>");
        return 2;
    };
    let client = match ApiClient::from_env() {
        Ok(client) => client,
        Err(err) => {
            eprintln!("could not build api client: {err}");
            return 1;
        }
    };
    match Guild::fetch(&client, guild_id) {
        Ok(guild) => {
            println!("{guild}");
            println!("Motto: {}", guild.motto);
            for member in &guild.members {
                println!("- {member}");
            }
            0
        }
        Err(err) => {
            eprintln!("guild fetch failed: {err}");
            1
        }
    }
}

fn handle_brawl(args: &[String]) -> i32 {
    let (Some(guild_id), Some(brawl_id)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: fraywatch brawl <guild_id> <brawl_id>");
        return 2;
    };
    let client = match ApiClient::from_env() {
        Ok(client) => client,
        Err(err) => {
            eprintln!("could not build api client: {err}");
            return 1;
        }
    };
    match Brawl::fetch(&client, guild_id, brawl_id) {
        Ok(brawl) => {
            println!("{brawl}");
            println!();
            println!("{}", brawl.markdown_results());
            0
        }
        Err(err) => {
            eprintln!("brawl fetch failed: {err}");
            1
        }
    }
}

fn handle_chests(args: &[String]) -> i32 {
    let Some(tier) = args.get(2).and_then(|name| ChestTier::from_name(name)) else {
        eprintln!("usage: fraywatch chests <minor|major|ultimate> [batch]");
        return 2;
    };
    let batch = parse_u32_arg(args.get(3), "batch", 1).max(1);
    let legendary_potion = !args.iter().any(|a| a == "--no-legendary-potion");
    let alchemy_potion = !args.iter().any(|a| a == "--no-alchemy-potion");

    let chest = ChestConfig::new(tier, batch, legendary_potion, alchemy_potion);
    let payload = serde_json::json!({
        "tier": tier.label(),
        "batch": batch,
        "cost": chest.cost(),
        "average_draw": chest.average_draw(),
    });
    match serde_json::to_string_pretty(&payload) {
        Ok(rendered) => {
            println!("{rendered}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize chest expectation: {err}");
            1
        }
    }
}

fn handle_serve() -> i32 {
    let bind_addr = env::var("FRAYWATCH_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    match server::run_server(&bind_addr) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn parse_u32_arg(raw: Option<&String>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok()).unwrap_or_else(|| {
        if let Some(value) = raw {
            if !value.starts_with("--") {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
        }
        default
    })
}
