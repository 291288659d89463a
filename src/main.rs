//! Headless run of the score core: a UI thread answers name prompts while the
//! simulation plays a few games and records them.

use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use runner_scores::database::keys;
use runner_scores::leaderboard::DisabledLeaderboard;
use runner_scores::name_input::{NameInputBridge, NameInputError};
use runner_scores::{CoreConfig, NameInputSurface, RunnerCore};

const GAMES: usize = 3;
const TICK: Duration = Duration::from_millis(16);
const NAME_PROMPT_TICKS: usize = 600;
const ADS_EVERY: i64 = 3;

/// What a player might type into the prompt.
const TYPED_NAMES: &[&str] = &["  ###  ", "  J@ne_Runner!! 2  ", "Ada", " $$$ ", "Pierre Eric Gautier"];

enum Prompt {
    Show,
    Hide,
    Quit,
}

struct ChannelSurface {
    prompts: Mutex<mpsc::Sender<Prompt>>,
}

impl NameInputSurface for ChannelSurface {
    fn show_prompt(&self) {
        if let Ok(prompts) = self.prompts.lock() {
            let _ = prompts.send(Prompt::Show);
        }
    }

    fn hide_prompt(&self) {
        if let Ok(prompts) = self.prompts.lock() {
            let _ = prompts.send(Prompt::Hide);
        }
    }
}

/// Plays the role of the UI thread: types names until one is accepted.
fn run_ui(prompts: mpsc::Receiver<Prompt>, names: NameInputBridge) {
    let mut rng = rand::thread_rng();
    while let Ok(prompt) = prompts.recv() {
        match prompt {
            Prompt::Show => loop {
                thread::sleep(Duration::from_millis(rng.gen_range(50..200)));
                let typed = TYPED_NAMES.choose(&mut rng).copied().unwrap_or("Anonymous");
                match names.supply(typed) {
                    Ok(()) => break,
                    Err(NameInputError::EmptyName) => info!(typed, "prompt rejected the name"),
                    Err(err) => {
                        warn!(%err, "prompt closed");
                        break;
                    }
                }
            },
            Prompt::Hide => info!("name prompt hidden"),
            Prompt::Quit => break,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    let config = CoreConfig::from_env().expect("invalid configuration");

    let (prompt_sender, prompt_receiver) = mpsc::channel();
    let quit = prompt_sender.clone();
    let surface = ChannelSurface {
        prompts: Mutex::new(prompt_sender),
    };
    let core = RunnerCore::open(&config, surface, Arc::new(DisabledLeaderboard))
        .await
        .expect("failed to open the score database");

    let ui = {
        let names = core.names().clone();
        thread::spawn(move || run_ui(prompt_receiver, names))
    };

    let mut pushes = Vec::with_capacity(GAMES);
    for game in 0..GAMES {
        let name = match ask_name(&core).await {
            Some(name) => name,
            None => "Anonymous".to_owned(),
        };

        let (points, coins) = {
            let mut rng = rand::thread_rng();
            (rng.gen_range(0..5000), rng.gen_range(0..40))
        };
        // The remote push runs on its own
        let push = core
            .submit_score(points, coins, &name)
            .await
            .expect("failed to record the game");
        pushes.push(push);

        let settings = core.settings();
        let played = settings
            .increment_int(keys::GAME_COUNT)
            .await
            .expect("failed to count the game");
        let until_ad = settings.get_int(keys::GAMES_BEFORE_AD, ADS_EVERY).await - 1;
        let until_ad = if until_ad <= 0 { ADS_EVERY } else { until_ad };
        settings
            .set_int(keys::GAMES_BEFORE_AD, until_ad)
            .await
            .expect("failed to store the ad counter");

        info!(game, played, points, coins, name = %name, until_ad, "game over");
    }

    for (rank, record) in core
        .top_scores(5)
        .await
        .expect("failed to read scores")
        .iter()
        .enumerate()
    {
        info!(rank = rank + 1, points = record.points, coins = record.coins, name = %record.name, "top score");
    }
    let coins = core.total_coins().await.expect("failed to count coins");
    let recent = core.recent_names(3).await.expect("failed to read names");
    info!(coins, ?recent, "ledger");

    // Let pushes still in flight finish or time out before exiting
    for push in pushes {
        match push.await {
            Ok(outcome) => info!(?outcome, "leaderboard push finished"),
            Err(err) => warn!(%err, "leaderboard push aborted"),
        }
    }

    let _ = quit.send(Prompt::Quit);
    let _ = ui.join();
}

/// Asks for a name and polls for it once per tick.
async fn ask_name(core: &RunnerCore) -> Option<String> {
    if let Err(err) = core.request_name() {
        warn!(%err, "name request refused");
        return None;
    }

    let mut ticks = tokio::time::interval(TICK);
    for _ in 0..NAME_PROMPT_TICKS {
        ticks.tick().await;
        if let Some(name) = core.poll_name() {
            return Some(name);
        }
    }
    core.names().cancel();
    None
}
