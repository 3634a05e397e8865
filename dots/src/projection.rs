use std::cmp::Ordering;

use crate::snapshot::{BoardSnapshot, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Player),
    Tie,
}

impl Outcome {
    pub fn from_scores(one: u32, two: u32) -> Self {
        match one.cmp(&two) {
            Ordering::Greater => Outcome::Winner(Player::One),
            Ordering::Less => Outcome::Winner(Player::Two),
            Ordering::Equal => Outcome::Tie,
        }
    }

    pub fn banner(self) -> String {
        match self {
            Outcome::Winner(player) => format!("{player} Wins!"),
            Outcome::Tie => "It's a Tie!".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub score_one: u32,
    pub score_two: u32,
    pub turn: Player,
    pub outcome: Option<Outcome>,
}

impl Projection {
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Self {
        let score_one = snapshot.score(Player::One);
        let score_two = snapshot.score(Player::Two);
        Self {
            score_one,
            score_two,
            turn: snapshot.current_player(),
            outcome: snapshot
                .is_game_over()
                .then(|| Outcome::from_scores(score_one, score_two)),
        }
    }

    pub fn turn_label(&self) -> String {
        format!("{}'s Turn", self.turn)
    }

    pub fn banner(&self) -> Option<String> {
        self.outcome.map(Outcome::banner)
    }

    /// One-line summary for the window title.
    pub fn title_line(&self) -> String {
        let status = self.banner().unwrap_or_else(|| self.turn_label());
        format!(
            "Dots and Boxes | P1 {} - P2 {} | {status}",
            self.score_one, self.score_two
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridDims;
    use crate::snapshot::SnapshotWire;

    fn finished(one: u32, two: u32) -> BoardSnapshot {
        let mut wire = SnapshotWire::fresh(GridDims::new(3, 3));
        wire.scores.insert("1".into(), one);
        wire.scores.insert("2".into(), two);
        wire.game_over = true;
        BoardSnapshot::try_from(wire).unwrap()
    }

    #[test]
    fn in_progress_shows_turn_without_banner() {
        let proj = Projection::from_snapshot(&BoardSnapshot::fresh(GridDims::new(2, 2)));
        assert_eq!(proj.turn_label(), "Player 1's Turn");
        assert_eq!(proj.banner(), None);
        assert_eq!(proj.title_line(), "Dots and Boxes | P1 0 - P2 0 | Player 1's Turn");
    }

    #[test]
    fn higher_score_wins() {
        assert_eq!(
            Projection::from_snapshot(&finished(6, 3)).banner().as_deref(),
            Some("Player 1 Wins!")
        );
        assert_eq!(
            Projection::from_snapshot(&finished(2, 7)).banner().as_deref(),
            Some("Player 2 Wins!")
        );
    }

    #[test]
    fn equal_scores_tie() {
        let proj = Projection::from_snapshot(&finished(4, 4));
        assert_eq!(proj.banner().as_deref(), Some("It's a Tie!"));
        assert!(proj.title_line().ends_with("It's a Tie!"));
    }
}
