//! Validation tests for the per-event rewriter

use drum_remap::mapping::{ConditionalTarget, RuleSet};
use drum_remap::rewrite::{Rewriter, DRUM_CHANNEL};
use midly::num::{u4, u7};
use midly::{MidiMessage, TrackEventKind};
use std::collections::HashMap;

fn note_on(channel: u8, key: u8, vel: u8) -> TrackEventKind<'static> {
    TrackEventKind::Midi {
        channel: u4::from(channel),
        message: MidiMessage::NoteOn {
            key: u7::from(key),
            vel: u7::from(vel),
        },
    }
}

fn note_off(channel: u8, key: u8, vel: u8) -> TrackEventKind<'static> {
    TrackEventKind::Midi {
        channel: u4::from(channel),
        message: MidiMessage::NoteOff {
            key: u7::from(key),
            vel: u7::from(vel),
        },
    }
}

fn fields(kind: &TrackEventKind) -> (u8, u8, u8) {
    match kind {
        TrackEventKind::Midi {
            channel,
            message: MidiMessage::NoteOn { key, vel },
        }
        | TrackEventKind::Midi {
            channel,
            message: MidiMessage::NoteOff { key, vel },
        } => (channel.as_int(), key.as_int(), vel.as_int()),
        other => panic!("not a note event: {:?}", other),
    }
}

/// Conditional {100: {38 -> (40, 127)}} over unconditional {38 -> 36}.
fn layered_rules() -> RuleSet {
    let notes = HashMap::from([(38, 36)]);
    let conditionals = HashMap::from([(
        100,
        HashMap::from([(
            38,
            ConditionalTarget {
                note: 40,
                velocity: Some(127),
            },
        )]),
    )]);
    RuleSet::new(notes, HashMap::new(), conditionals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_is_forced_for_every_note_event() {
        let rewriter = Rewriter::new(Some(layered_rules()));
        for channel in 0..16 {
            let mut on = note_on(channel, 60, 80);
            let mut off = note_off(channel, 60, 80);
            rewriter.rewrite_event(&mut on);
            rewriter.rewrite_event(&mut off);
            assert_eq!(fields(&on).0, DRUM_CHANNEL);
            assert_eq!(fields(&off).0, DRUM_CHANNEL);
        }
    }

    #[test]
    fn pass_through_forces_channel_only() {
        let rewriter = Rewriter::pass_through();
        assert!(rewriter.is_pass_through());

        let mut event = note_on(3, 38, 100);
        rewriter.rewrite_event(&mut event);
        assert_eq!(fields(&event), (DRUM_CHANNEL, 38, 100));
    }

    #[test]
    fn unmapped_note_keeps_its_number() {
        let rewriter = Rewriter::new(Some(layered_rules()));
        let mut event = note_on(0, 60, 90);
        rewriter.rewrite_event(&mut event);
        assert_eq!(fields(&event), (DRUM_CHANNEL, 60, 90));
    }

    #[test]
    fn conditional_entry_wins_at_exact_velocity() {
        let rewriter = Rewriter::new(Some(layered_rules()));
        let mut event = note_on(0, 38, 100);
        rewriter.rewrite_event(&mut event);
        assert_eq!(fields(&event), (DRUM_CHANNEL, 40, 127));
    }

    #[test]
    fn near_miss_velocity_uses_unconditional_table() {
        let rewriter = Rewriter::new(Some(layered_rules()));
        let mut event = note_on(0, 38, 99);
        rewriter.rewrite_event(&mut event);
        assert_eq!(fields(&event), (DRUM_CHANNEL, 36, 99));
    }

    #[test]
    fn velocity_override_does_not_touch_note_off() {
        let rules = RuleSet::new(
            HashMap::from([(38, 36)]),
            HashMap::from([(38, 127)]),
            HashMap::new(),
        );
        let rewriter = Rewriter::new(Some(rules));

        let mut event = note_off(0, 38, 64);
        rewriter.rewrite_event(&mut event);
        // Note remapped, channel forced, velocity left alone
        assert_eq!(fields(&event), (DRUM_CHANNEL, 36, 64));
    }

    #[test]
    fn velocity_zero_note_on_keeps_its_velocity() {
        let rules = RuleSet::new(
            HashMap::from([(38, 36)]),
            HashMap::from([(38, 127)]),
            HashMap::new(),
        );
        let rewriter = Rewriter::new(Some(rules));

        let mut event = note_on(0, 38, 0);
        rewriter.rewrite_event(&mut event);
        assert_eq!(fields(&event), (DRUM_CHANNEL, 36, 0));
    }

    #[test]
    fn sounding_note_on_gets_the_override() {
        let rules = RuleSet::new(
            HashMap::from([(38, 36)]),
            HashMap::from([(38, 127)]),
            HashMap::new(),
        );
        let rewriter = Rewriter::new(Some(rules));

        let mut event = note_on(0, 38, 64);
        rewriter.rewrite_event(&mut event);
        assert_eq!(fields(&event), (DRUM_CHANNEL, 36, 127));
    }

    #[test]
    fn non_note_events_are_untouched() {
        let rewriter = Rewriter::new(Some(layered_rules()));

        let mut meta = TrackEventKind::Meta(midly::MetaMessage::EndOfTrack);
        rewriter.rewrite_event(&mut meta);
        assert_eq!(meta, TrackEventKind::Meta(midly::MetaMessage::EndOfTrack));

        let mut control = TrackEventKind::Midi {
            channel: u4::from(2),
            message: MidiMessage::Controller {
                controller: u7::from(64),
                value: u7::from(127),
            },
        };
        let before = control;
        rewriter.rewrite_event(&mut control);
        assert_eq!(control, before);
    }

    #[test]
    fn rewrite_file_preserves_event_order() {
        use midly::num::{u15, u24, u28};
        use midly::{Format, Header, Timing, TrackEvent};
        let track = vec![
            TrackEvent {
                delta: u28::from(0),
                kind: note_on(0, 38, 100),
            },
            TrackEvent {
                delta: u28::from(10),
                kind: TrackEventKind::Meta(midly::MetaMessage::Tempo(u24::from(500_000))),
            },
            TrackEvent {
                delta: u28::from(20),
                kind: note_off(0, 38, 0),
            },
            TrackEvent {
                delta: u28::from(0),
                kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
            },
        ];
        let mut smf = midly::Smf {
            header: Header {
                format: Format::SingleTrack,
                timing: Timing::Metrical(u15::from(480)),
            },
            tracks: vec![track],
        };

        let rewriter = Rewriter::new(Some(layered_rules()));
        rewriter.rewrite_file(&mut smf);

        let deltas: Vec<u32> = smf.tracks[0].iter().map(|e| e.delta.as_int()).collect();
        assert_eq!(deltas, vec![0, 10, 20, 0]);
        assert_eq!(fields(&smf.tracks[0][0].kind), (DRUM_CHANNEL, 40, 127));
        assert_eq!(fields(&smf.tracks[0][2].kind), (DRUM_CHANNEL, 36, 0));
    }
}
