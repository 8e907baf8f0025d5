//! `SCHEDULED_ZONES` report: VWAP deviation zones for a scheduled slot.

use crate::payload::InboundEvent;
use std::fmt;

pub const SCHEDULED_ZONES: &str = "SCHEDULED_ZONES";

/// One side (`buy` or `sell`) of the report, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviationZone {
    pub devs: [String; 4],
    pub sl: String,
    pub tp: String,
}

impl DeviationZone {
    pub fn from_section(section: &InboundEvent) -> Self {
        Self {
            devs: ["dev2", "dev3", "dev4", "dev5"].map(|key| section.price(key)),
            sl: section.price("sl"),
            tp: section.price("tp"),
        }
    }
}

/// The full report, built field by field from an event.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledZonesReport {
    pub symbol: String,
    pub timeframe: String,
    pub slot: String,
    pub bar_close: String,
    pub vwap: String,
    pub buy: DeviationZone,
    pub sell: DeviationZone,
}

impl ScheduledZonesReport {
    pub fn from_event(event: &InboundEvent) -> Self {
        Self {
            symbol: event.label("symbol"),
            timeframe: event.label("tf"),
            slot: event.label("slot_gmt"),
            bar_close: event.time(),
            vwap: event.price("vwap"),
            buy: DeviationZone::from_section(&event.section("buy")),
            sell: DeviationZone::from_section(&event.section("sell")),
        }
    }
}

fn write_zone(f: &mut fmt::Formatter<'_>, heading: &str, zone: &DeviationZone) -> fmt::Result {
    writeln!(f, "{heading} (Dev2–Dev5)")?;
    for (n, dev) in (2..=5).zip(&zone.devs) {
        writeln!(f, "Dev{n}: {dev}")?;
    }
    writeln!(f, "SL:   {}", zone.sl)?;
    writeln!(f, "TP:   {}", zone.tp)
}

impl fmt::Display for ScheduledZonesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Scheduled VWAP Deviation Zones")?;
        writeln!(f, "Symbol: {}", self.symbol)?;
        writeln!(f, "Timeframe: {}", self.timeframe)?;
        writeln!(f, "Slot (GMT): {}", self.slot)?;
        writeln!(f, "Bar Close: {}", self.bar_close)?;
        writeln!(f, "VWAP: {}", self.vwap)?;
        writeln!(f)?;
        write_zone(f, "🟩 BUY", &self.buy)?;
        writeln!(f)?;
        write_zone(f, "🟥 SELL", &self.sell)
    }
}
