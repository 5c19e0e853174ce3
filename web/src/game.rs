use chrono::prelude::*;
use gloo::events::EventListener;
use gloo::timers::callback::Interval;
use minewalk_core as walk;
use wasm_bindgen::JsCast;
use yew::prelude::*;

use crate::utils::*;

fn utc_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

/// Movement keys: arrows or WASD. Everything else is ignored.
fn flag_for_key(key: &str) -> Option<walk::InputFlags> {
    use walk::InputFlags as Flags;

    match key {
        "ArrowUp" | "w" | "W" => Some(Flags::UP),
        "ArrowDown" | "s" | "S" => Some(Flags::DOWN),
        "ArrowLeft" | "a" | "A" => Some(Flags::LEFT),
        "ArrowRight" | "d" | "D" => Some(Flags::RIGHT),
        _ => None,
    }
}

/// One play-through plus the display bookkeeping the core does not track.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct WalkSession {
    pub engine: walk::WalkEngine,
    pub difficulty: walk::Difficulty,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub tick_count: u32,
}

impl WalkSession {
    fn new(engine: walk::WalkEngine, difficulty: walk::Difficulty) -> Self {
        Self {
            engine,
            difficulty,
            started_at: None,
            ended_at: None,
            tick_count: 0,
        }
    }

    fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.ended_at.unwrap_or(now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }

    fn advance(&mut self, input: walk::InputFlags, now: DateTime<Utc>) -> walk::TickOutcome {
        let outcome = self.engine.tick(input);
        self.tick_count = self.tick_count.saturating_add(1);

        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if self.engine.is_finished() && self.ended_at.is_none() {
            self.ended_at = Some(now);
        }

        outcome
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Tick,
    KeyChange {
        flag: walk::InputFlags,
        pressed: bool,
    },
    Start(walk::Difficulty),
    Reset,
}

#[derive(Properties, Clone, Debug, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[prop_or_default]
    pub seed: Option<u64>,
}

#[derive(Debug)]
pub(crate) struct GameView {
    session: Option<WalkSession>,
    pressed: walk::InputFlags,
    seed_override: Option<u64>,
    tick_interval: Option<Interval>,
    _keydown: EventListener,
    _keyup: EventListener,
}

impl GameView {
    fn create_ticker(ctx: &Context<Self>) -> Interval {
        let link = ctx.link().clone();
        Interval::new(walk::TICK_INTERVAL_MS, move || link.send_message(Msg::Tick))
    }

    fn key_listener(ctx: &Context<Self>, event_type: &'static str, pressed: bool) -> EventListener {
        let link = ctx.link().clone();
        EventListener::new(&gloo::utils::window(), event_type, move |event| {
            let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                return;
            };
            if event.repeat() {
                return;
            }
            if let Some(flag) = flag_for_key(&event.key()) {
                event.prevent_default();
                link.send_message(Msg::KeyChange { flag, pressed });
            }
        })
    }

    fn start_session(&mut self, ctx: &Context<Self>, difficulty: walk::Difficulty) -> bool {
        use walk::FieldGenerator;

        let seed = self.seed_override.unwrap_or_else(js_random_seed);
        let config = difficulty.game_config();
        let generator = walk::RandomFieldGenerator::new(seed, config.start_cell());

        match generator.generate(config) {
            Ok(field) => {
                log::info!("new {:?} session (seed {})", difficulty, seed);
                self.pressed = walk::InputFlags::empty();
                self.session = Some(WalkSession::new(walk::WalkEngine::new(field), difficulty));
                self.tick_interval = Some(Self::create_ticker(ctx));
                true
            }
            Err(err) => {
                log::error!("could not start session: {err}");
                false
            }
        }
    }

    fn state_class(&self) -> Classes {
        use walk::EngineState::*;

        classes!(match self.session.as_ref().map(|s| s.engine.state()) {
            None => "not-started",
            Some(Ready | Active) => "in-progress",
            Some(Victory) => "win",
            Some(GameOver) => "lose",
        })
    }

    fn cell_class(session: &WalkSession, cell: walk::Cell) -> Classes {
        let engine = &session.engine;
        let mut class = classes!("cell");

        if engine.exploded_cell() == Some(cell) {
            class.push(classes!("open", "mine", "oops"));
        } else if engine.is_revealed(cell) {
            class.push(classes!(
                "open",
                format!("num-{}", engine.field().adjacent_mines(cell))
            ));
        } else if engine.is_finished() && engine.field().contains(cell) {
            // endgame disclosure of the remaining mines
            class.push("mine");
        }

        if engine.current_cell() == cell {
            class.push("player");
        }
        class
    }

    fn cell_label(session: &WalkSession, cell: walk::Cell) -> Option<String> {
        let engine = &session.engine;
        if engine.exploded_cell() == Some(cell) || !engine.is_revealed(cell) {
            return None;
        }
        match engine.field().adjacent_mines(cell) {
            0 => None,
            count => Some(count.to_string()),
        }
    }

    fn grid_view(&self, session: &WalkSession) -> Html {
        let half = session.engine.field().half();

        html! {
            <table>
                {
                    // far edge (the goal line) on top
                    for (-half..half).map(|z| html! {
                        <tr>
                            {
                                for (-half..half).map(|x| {
                                    let class = Self::cell_class(session, (x, z));
                                    let label = Self::cell_label(session, (x, z)).unwrap_or_default();
                                    html! { <td {class}>{label}</td> }
                                })
                            }
                        </tr>
                    })
                }
            </table>
        }
    }

    fn menu_view(&self, ctx: &Context<Self>) -> Html {
        use walk::Difficulty::*;

        let button = |difficulty: walk::Difficulty, label: &str| {
            let onclick = ctx.link().callback(move |_| Msg::Start(difficulty));
            html! { <button {onclick}>{label}</button> }
        };

        html! {
            <section class="menu">
                <h1>{"minewalk"}</h1>
                <p>{"Walk to the far edge. Arrows or WASD to move; stepping on a mine's center ends the run."}</p>
                { button(Easy, "Easy") }
                { button(Normal, "Normal") }
                { button(Hard, "Hard") }
            </section>
        }
    }

    fn session_view(&self, ctx: &Context<Self>, session: &WalkSession) -> Html {
        let mines = format_for_counter(session.engine.field().mine_count() as i32);
        let elapsed = format_for_counter(session.elapsed_secs(utc_now()) as i32);
        let cb_reset = ctx.link().callback(|_| Msg::Reset);
        let banner = match session.engine.state() {
            walk::EngineState::GameOver => Some("Boom. Back to the menu?"),
            walk::EngineState::Victory => Some("You made it across."),
            _ => None,
        };

        html! {
            <>
                <nav>
                    <aside>{mines}</aside>
                    <span><button class={self.state_class()} onclick={cb_reset}/></span>
                    <aside>{elapsed}</aside>
                </nav>
                { self.grid_view(session) }
                if let Some(banner) = banner {
                    <footer>{banner}</footer>
                }
            </>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            session: None,
            pressed: walk::InputFlags::empty(),
            seed_override: ctx.props().seed,
            tick_interval: None,
            _keydown: Self::key_listener(ctx, "keydown", true),
            _keyup: Self::key_listener(ctx, "keyup", false),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Tick => {
                let Some(session) = self.session.as_mut() else {
                    return false;
                };
                let outcome = session.advance(self.pressed, utc_now());
                if session.engine.is_finished() {
                    // stop driving a frozen session
                    self.tick_interval = None;
                }
                outcome.has_update()
            }
            KeyChange { flag, pressed } => {
                let next = if pressed {
                    self.pressed | flag
                } else {
                    self.pressed - flag
                };
                log::trace!("pressed keys: {:?}", next);
                self.pressed = next;
                false
            }
            Start(difficulty) => self.start_session(ctx, difficulty),
            Reset => {
                log::debug!("session reset");
                self.pressed = walk::InputFlags::empty();
                self.tick_interval = None;
                self.session.take().is_some()
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class={classes!("minewalk", self.state_class())}>
                {
                    match self.session.as_ref() {
                        None => self.menu_view(ctx),
                        Some(session) => self.session_view(ctx, session),
                    }
                }
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walk::{InputFlags, MineField, WalkEngine};

    fn t(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    fn session(mines: &[walk::Cell]) -> WalkSession {
        let field = MineField::from_cells(10, mines).unwrap();
        WalkSession::new(WalkEngine::new(field), walk::Difficulty::Easy)
    }

    #[test]
    fn movement_keys_map_to_flags_and_others_are_ignored() {
        assert_eq!(flag_for_key("ArrowUp"), Some(InputFlags::UP));
        assert_eq!(flag_for_key("w"), Some(InputFlags::UP));
        assert_eq!(flag_for_key("S"), Some(InputFlags::DOWN));
        assert_eq!(flag_for_key("a"), Some(InputFlags::LEFT));
        assert_eq!(flag_for_key("ArrowRight"), Some(InputFlags::RIGHT));
        assert_eq!(flag_for_key(" "), None);
        assert_eq!(flag_for_key("Escape"), None);
    }

    #[test]
    fn first_advance_records_the_start_time() {
        let mut session = session(&[]);
        assert_eq!(session.elapsed_secs(t(10)), 0);

        session.advance(InputFlags::UP, t(10));
        assert_eq!(session.started_at, Some(t(10)));
        assert_eq!(session.ended_at, None);
        assert_eq!(session.elapsed_secs(t(14)), 4);
    }

    #[test]
    fn finishing_freezes_the_clock() {
        let mut session = session(&[]);

        for tick in 0..200 {
            session.advance(InputFlags::UP, t(10 + tick));
            if session.engine.is_finished() {
                break;
            }
        }

        assert!(session.engine.victory());
        let ended_at = session.ended_at.expect("finished session has an end time");
        assert_eq!(session.elapsed_secs(t(10_000)), session.elapsed_secs(ended_at));

        // frozen sessions ignore further input
        let ticks = session.tick_count;
        session.advance(InputFlags::DOWN, t(9_999));
        assert_eq!(session.ended_at, Some(ended_at));
        assert_eq!(session.tick_count, ticks.saturating_add(1));
        assert!(session.engine.victory());
    }
}
