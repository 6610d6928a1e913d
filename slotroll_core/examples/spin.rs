use slotroll_core::{GameConfig, GameService, ThreadRandom};

fn main() {
    // One session, rolled until it busts or ten rolls pass, then cashed out.
    let service = GameService::from_config(&GameConfig::default(), ThreadRandom).expect("default config");
    let (session, _) = service.resolve_or_create_session(None);
    let token = session.id.to_string();
    println!("session={} credits={}", session.id, session.credits);

    for _ in 0..10 {
        match service.roll(Some(&token)) {
            Ok(receipt) => {
                println!(
                    "symbols={:?} win={} reward={} credits={}",
                    receipt.outcome.symbols, receipt.outcome.is_win, receipt.outcome.reward, receipt.credits
                );
                if receipt.game_over {
                    println!("game over");
                    return;
                }
            }
            Err(err) => {
                println!("rejected: {err}");
                return;
            }
        }
    }

    match service.cashout(Some(&token)) {
        Ok(receipt) => println!("{} ({} credits)", receipt.message, receipt.credits),
        Err(err) => println!("cashout rejected: {err}"),
    }
}
