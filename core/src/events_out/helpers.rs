use crate::event::InvestigationEvent;
use crate::events_out::EventsOutTx;

pub async fn write_investigation_event(out: Option<&EventsOutTx>, ev: &InvestigationEvent) {
    let Some(out) = out else {
        return;
    };
    if let Ok(line) = serde_json::to_string(ev) {
        out.send_line(line).await;
    }
}
