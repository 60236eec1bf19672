use crate::api::JournalApi;
use crate::controller::{JournalClient, PendingRequest};
use crate::journal_state::JournalState;
use crate::ui::{map_key, Command, PAGE_SIZE, UI};
use color_eyre::Result;
use crossterm::event::{Event, EventStream};
use futures::stream::{FuturesUnordered, StreamExt};

pub enum Step {
    Continue(Option<PendingRequest>),
    Quit,
}

pub fn handle_command<A: JournalApi + 'static>(
    client: &mut JournalClient<A>,
    command: Command,
) -> Step {
    match command {
        Command::Submit => Step::Continue(client.submit()),
        Command::Refresh => Step::Continue(Some(client.refresh())),
        Command::Quit => Step::Quit,
        edit => {
            apply_edit(client.state_mut(), edit);
            Step::Continue(None)
        }
    }
}

fn apply_edit(state: &mut JournalState, command: Command) {
    match command {
        Command::Insert(c) => state.insert_char(c),
        Command::Newline => state.insert_newline(),
        Command::Backspace => state.backspace(),
        Command::Delete => state.delete(),
        Command::Left => state.move_left(),
        Command::Right => state.move_right(),
        Command::Home => state.move_home(),
        Command::End => state.move_end(),
        Command::ScrollUp => state.scroll_up(1),
        Command::ScrollDown => state.scroll_down(1),
        Command::PageUp => state.scroll_up(PAGE_SIZE),
        Command::PageDown => state.scroll_down(PAGE_SIZE),
        Command::Submit | Command::Refresh | Command::Quit => {}
    }
}

/// Runs the interactive page until the user quits. Requests are never
/// awaited inline; the page keeps taking input while they are in flight.
pub async fn run<A: JournalApi + 'static>(client: &mut JournalClient<A>, ui: &mut UI) -> Result<()> {
    let mut events = EventStream::new();
    let mut in_flight: FuturesUnordered<PendingRequest> = FuturesUnordered::new();
    in_flight.push(client.load());

    loop {
        ui.display(client.state())?;

        tokio::select! {
            Some(outcome) = in_flight.next(), if !in_flight.is_empty() => {
                if let Some(follow_up) = client.apply(outcome) {
                    in_flight.push(follow_up);
                }
            }
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    let Some(command) = map_key(key) else { continue };
                    match handle_command(client, command) {
                        Step::Continue(Some(request)) => in_flight.push(request),
                        Step::Continue(None) => {}
                        Step::Quit => break,
                    }
                }
                // resize and friends only need a redraw
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => break,
            }
        }
    }

    if !in_flight.is_empty() {
        tracing::info!(pending = in_flight.len(), "leaving with requests still in flight");
    }
    Ok(())
}
