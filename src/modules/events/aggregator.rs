//! Folds flat `events LEFT JOIN event_blocks` rows into nested events.

use std::collections::HashMap;

use liceum_models::{Event, EventBlock, JoinedEventRow};

/// Groups rows by event id, preserving row order for each event's blocks.
///
/// Event-level columns are taken from the first row seen for an id. Rows
/// with a null block id contribute the event only, so an event without
/// blocks still appears with an empty list. Null block sub-fields become
/// empty strings or the epoch.
pub fn aggregate_events<I>(rows: I) -> Vec<Event>
where
    I: IntoIterator<Item = JoinedEventRow>,
{
    let mut events: Vec<Event> = Vec::new();
    let mut slots: HashMap<i32, usize> = HashMap::new();

    for row in rows {
        let JoinedEventRow {
            event_id,
            event_name,
            event_description,
            block_id,
            block_name,
            block_description,
            block_start_date,
            block_end_date,
            block_link,
        } = row;

        let slot = match slots.get(&event_id) {
            Some(&slot) => slot,
            None => {
                events.push(Event {
                    id: event_id,
                    name: event_name,
                    description: event_description,
                    blocks: Vec::new(),
                });
                slots.insert(event_id, events.len() - 1);
                events.len() - 1
            }
        };

        if let Some(block_id) = block_id {
            events[slot].blocks.push(EventBlock {
                id: block_id,
                event_id,
                name: block_name.unwrap_or_default(),
                description: block_description.unwrap_or_default(),
                start_date: block_start_date.unwrap_or_default(),
                end_date: block_end_date.unwrap_or_default(),
                link: block_link.unwrap_or_default(),
            });
        }
    }

    events
}
