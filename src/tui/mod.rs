pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::debug;

use crate::app::{AppContext, ErrorKind, Result};
use crate::domain::{ChapterId, NovelId};
use crate::reader::{Reader, ReaderState};

use self::app::{TuiApp, UiMessage};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

enum Navigation {
    Open(ChapterId),
    Next,
    Prev,
    Retry,
}

/// Read `start` in the terminal. `novel` supplies the chapter list used
/// for the position indicator; it defaults to the chapter's parent page.
pub async fn run(ctx: Arc<AppContext>, start: ChapterId, novel: Option<NovelId>) -> Result<()> {
    for (binding, reason) in ctx.config.keybindings.invalid_bindings() {
        tracing::warn!("ignoring keybinding {:?}: {}", binding, reason);
    }

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, start, novel).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Tui,
    ctx: Arc<AppContext>,
    start: ChapterId,
    novel: Option<NovelId>,
) -> Result<()> {
    let config = ctx.config.clone();
    let reader = Arc::new(Reader::new(ctx.library.clone(), &config.reader));
    let mut tui_app = TuiApp::new(config.reader.overscan);
    let event_handler = EventHandler::new(Duration::from_millis(config.reader.tick_rate_ms));
    let (tx, mut rx) = mpsc::unbounded_channel();

    if let Some(novel) = novel.or_else(|| start.novel_id()) {
        load_novel(&ctx, novel, &tx);
    }
    navigate(&reader, &tx, Navigation::Open(start));

    loop {
        while let Ok(message) = rx.try_recv() {
            tui_app.handle_message(message);
        }

        let state = reader.state();
        tui_app.sync(&state);
        terminal.draw(|frame| layout::render(frame, &mut tui_app, &state, &config.colors, &config.keybindings))?;
        if reader.note_scroll(&tui_app.viewport) {
            debug!("prefetch started at {:.0}%", tui_app.viewport.progress() * 100.0);
        }

        match event_handler.next()? {
            AppEvent::Key(key) => {
                let action = config.keybindings.get_action(&key);
                match action {
                    Action::Quit => {
                        tui_app.should_quit = true;
                    }
                    Action::ScrollUp => {
                        tui_app.viewport.scroll_up(1);
                    }
                    Action::ScrollDown => {
                        tui_app.viewport.scroll_down(1);
                    }
                    Action::PageUp => {
                        tui_app.viewport.page_up();
                    }
                    Action::PageDown => {
                        if tui_app.viewport.at_end() && state.chapter().is_some_and(|c| c.has_next()) {
                            navigate(&reader, &tx, Navigation::Next);
                        } else {
                            tui_app.viewport.page_down();
                        }
                    }
                    Action::Top => {
                        tui_app.viewport.scroll_to_top();
                    }
                    Action::NextChapter => {
                        navigate(&reader, &tx, Navigation::Next);
                    }
                    Action::PrevChapter => {
                        navigate(&reader, &tx, Navigation::Prev);
                    }
                    Action::Retry => {
                        navigate(&reader, &tx, Navigation::Retry);
                    }
                    Action::OpenInBrowser => {
                        let url = match &state {
                            ReaderState::Displaying(chapter) => Some(chapter.id.as_str()),
                            ReaderState::Loading(id) | ReaderState::Error { target: id, .. } => {
                                Some(id.as_str())
                            }
                            ReaderState::Idle => None,
                        };
                        if let Some(url) = url {
                            if let Err(e) = open::that(url) {
                                tui_app.set_status(format!("Failed to open browser: {}", e));
                            }
                        }
                    }
                    Action::None => {}
                }
            }
            AppEvent::Resize | AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Run a reader transition off the UI loop; the result shows up through
/// the reader's state channel.
fn navigate(reader: &Arc<Reader>, tx: &UnboundedSender<UiMessage>, nav: Navigation) {
    let reader = reader.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = match nav {
            Navigation::Open(id) => reader.open(id).await,
            Navigation::Next => reader.navigate_next().await,
            Navigation::Prev => reader.navigate_prev().await,
            Navigation::Retry => match reader.retry().await {
                Some(result) => result,
                None => return,
            },
        };
        match result {
            Ok(chapter) => debug!("displaying {}", chapter.id),
            Err(e) if e.kind == ErrorKind::NotFound => {
                let _ = tx.send(UiMessage::Status(e.cause));
            }
            Err(e) => debug!("reader transition failed: {}", e),
        }
    });
}

fn load_novel(ctx: &AppContext, novel: NovelId, tx: &UnboundedSender<UiMessage>) {
    let library = ctx.library.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        match library.novel(&novel).await {
            Ok(detail) => {
                let _ = tx.send(UiMessage::Novel(detail));
            }
            Err(e) => debug!("chapter list unavailable for {}: {}", novel, e),
        }
    });
}
