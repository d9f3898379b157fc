// File: src/model/adapter.rs
use crate::model::item::{Calendar, CalendarEvent};
use chrono::{TimeDelta, Utc};
use icalendar::{Calendar as IcsCalendar, Component, Event, EventLike};

fn format_iso_duration(d: TimeDelta) -> String {
    let mins = d.num_minutes();
    match (mins / 60, mins % 60) {
        (0, m) => format!("PT{}M", m),
        (h, 0) => format!("PT{}H", h),
        (h, m) => format!("PT{}H{}M", h, m),
    }
}

impl CalendarEvent {
    /// Builds the VEVENT for this lesson. `seq` keeps UIDs distinct for
    /// several lessons sharing one slot.
    pub fn to_ics_event(&self, seq: usize) -> Event {
        let mut event = Event::new();
        event.uid(&format!(
            "{}-{}@raspical",
            self.start.format("%Y%m%dT%H%M%S"),
            seq
        ));
        event.summary(&self.name);
        event.description(&self.description);
        if !self.location.is_empty() {
            event.location(&self.location);
        }
        event.timestamp(Utc::now());

        // Floating local time: the schedule has no zone information.
        event.add_property("DTSTART", self.start.format("%Y%m%dT%H%M%S").to_string());
        event.add_property("DURATION", format_iso_duration(self.duration));

        for category in self.categories.iter().filter(|c| !c.is_empty()) {
            event.append_multi_property(icalendar::Property::new("CATEGORIES", category));
        }
        for contact in self.contacts.iter().filter(|c| !c.is_empty()) {
            event.append_multi_property(icalendar::Property::new("CONTACT", contact));
        }

        event.done()
    }
}

impl Calendar {
    pub fn to_ics(&self) -> String {
        let mut calendar = IcsCalendar::new();
        calendar.name(&self.name);
        for (seq, ev) in self.events.iter().enumerate() {
            calendar.push(ev.to_ics_event(seq));
        }
        calendar.done().to_string()
    }
}
