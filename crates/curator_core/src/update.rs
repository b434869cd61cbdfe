use crate::{CrawlRequest, CrawlState, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: CrawlState, msg: Msg) -> (CrawlState, Vec<Effect>) {
    match msg {
        Msg::Seeded(urls) => {
            if state.session() != SessionState::Idle {
                return (state, Vec::new());
            }
            state.start();
            for url in urls {
                state.admit(CrawlRequest { url, depth: 0 });
            }
        }
        Msg::JobFinished { job_id, discovered } => {
            if state.complete(job_id).is_none() {
                return (state, Vec::new());
            }
            // admit() refuses everything once halted
            for request in discovered {
                state.admit(request);
            }
        }
        Msg::HaltRequested => {
            state.halt();
        }
    }

    let mut effects = state.dispatch();
    effects.extend(state.finish_if_drained());
    (state, effects)
}
