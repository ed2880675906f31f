use crate::{Card, GameView, Phase, PlayerId};

/// Renders a window of the human hand, numbering the cards from 1 within the window.
pub fn visualize_hand_window(cards: &[Card], start: usize, total: usize) -> String {
    let mut result = String::new();
    if start > 0 {
        result += "< ";
    }
    for (i, card) in cards.iter().enumerate() {
        result += &format!("[{}] {:<3} ", i + 1, card.face.to_string());
    }
    if start + cards.len() < total {
        result += ">";
    }
    result.trim_end().to_string()
}

/// Renders the whole table as seen by the human.
pub fn visualize_view(view: &GameView, window_start: usize, window_width: usize) -> String {
    let top = match view.top_card {
        Some(card) => card.face.to_string(),
        None => String::from("--"),
    };
    let window = view.human_hand.window(window_start, window_width);
    let start = window_start.min(view.human_hand.len());
    let end = start + window.len();

    let mut result = format!(
        "  table: {:<4} draw pile: {:<3} discard pile: {}\n",
        top, view.draw_pile_len, view.discard_pile_len
    );
    result += &format!("  machine: {}", "🂠 ".repeat(view.machine_card_count.min(4)));
    if view.machine_card_count > 4 {
        result += &format!("(+{})", view.machine_card_count - 4);
    }
    if view.machine_owes_declaration {
        result += "  <- one card left, no UNO yet";
    }
    result += &format!(
        "\n  you ({}-{} of {}): {}\n",
        if window.is_empty() { 0 } else { start + 1 },
        end,
        view.human_hand.len(),
        visualize_hand_window(window, start, view.human_hand.len())
    );
    result += match view.phase {
        Phase::Setup => "  waiting for the deal",
        Phase::HumanTurn => "  your turn",
        Phase::MachineTurn => "  the machine is thinking...",
        Phase::GameOver {
            winner: PlayerId::Human,
        } => "  game over, you won",
        Phase::GameOver {
            winner: PlayerId::Machine,
        } => "  game over, the machine won",
        Phase::Aborted => "  game aborted, the deck ran out",
    };
    result
}
