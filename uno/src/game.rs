use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::{
    mint_cards, Card, CardId, Deck, DeckExhausted, Face, GameError, GameEvent, GameView, Hand,
    Player, PlayerId, Table, Value,
};

/// Where a game stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Not dealt yet.
    Setup,
    HumanTurn,
    MachineTurn,
    GameOver { winner: PlayerId },
    /// The deck ran out of cards.
    Aborted,
}

impl Phase {
    /// The player who is allowed to act, if any.
    pub fn turn(self) -> Option<PlayerId> {
        match self {
            Phase::HumanTurn => Some(PlayerId::Human),
            Phase::MachineTurn => Some(PlayerId::Machine),
            Phase::Setup | Phase::GameOver { .. } | Phase::Aborted => None,
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(self, Phase::GameOver { .. } | Phase::Aborted)
    }

    fn turn_of(player: PlayerId) -> Self {
        match player {
            PlayerId::Human => Phase::HumanTurn,
            PlayerId::Machine => Phase::MachineTurn,
        }
    }
}

/// Summarizes the outcome of playing a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayOutcome {
    pub card: Card,
    /// The card skipped the opponent, so the same player moves again.
    pub requires_extra_turn: bool,
}

/// A fixed arrangement of cards to start a game from, instead of dealing.
///
/// Card ids are handed out in the order human hand, machine hand, draw pile,
/// discard pile, top card. The last face of `draw_pile` is drawn first.
#[derive(Clone, Debug)]
pub struct Layout {
    pub human: Vec<Face>,
    pub machine: Vec<Face>,
    pub top: Face,
    pub draw_pile: Vec<Face>,
    /// Cards below the top card.
    pub discard_pile: Vec<Face>,
}

/// A game between a human and the machine.
///
/// This is the only place where hands, deck and table are changed. It is not
/// synchronized in any way; callers that share a game between threads have to
/// put all access behind a single lock.
///
/// Every change is also recorded as a [`GameEvent`], to be picked up with
/// [`Self::drain_events()`].
#[derive(Clone, Debug)]
pub struct Game {
    players: [Player; 2],
    deck: Deck,
    table: Table,
    phase: Phase,
    total_cards: usize,
    events: Vec<GameEvent>,
}

impl Game {
    pub const INITIAL_HAND_SIZE: usize = 5;

    /// A game that will be dealt from `deck` by [`Self::start()`].
    pub fn new(deck: Deck) -> Self {
        let total_cards = deck.len();
        Self {
            players: [Player::new(PlayerId::Human), Player::new(PlayerId::Machine)],
            deck,
            table: Table::new(),
            phase: Phase::Setup,
            total_cards,
            events: Vec::new(),
        }
    }

    /// A game with the standard catalog, shuffled with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(Deck::standard(StdRng::seed_from_u64(seed)))
    }

    /// A game that is already dealt according to `layout`, with the human to move.
    pub fn from_layout(layout: Layout, rng: StdRng) -> Result<Self, GameError> {
        if layout.human.is_empty() || layout.machine.is_empty() {
            return Err(GameError::InvalidLayout {
                reason: "both hands need at least one card",
            });
        }
        let (human_len, machine_len) = (layout.human.len(), layout.machine.len());
        let draw_len = layout.draw_pile.len();
        let mut cards = mint_cards(
            layout
                .human
                .into_iter()
                .chain(layout.machine)
                .chain(layout.draw_pile)
                .chain(layout.discard_pile),
        );
        let top = Card::new(CardId(cards.len() as u16), layout.top);
        let mut discard_pile = cards.split_off(human_len + machine_len + draw_len);
        discard_pile.push(top);
        let draw_pile = cards.split_off(human_len + machine_len);
        let machine_hand = cards.split_off(human_len);
        let human_hand = cards;

        let mut game = Self::new(Deck::stacked(draw_pile, discard_pile, rng));
        game.total_cards += human_len + machine_len;
        for card in human_hand {
            game.player_mut(PlayerId::Human).receive(card);
        }
        for card in machine_hand {
            game.player_mut(PlayerId::Machine).receive(card);
        }
        game.table.place(top);
        game.phase = Phase::HumanTurn;
        game.events.extend([
            GameEvent::HandsChanged,
            GameEvent::TableChanged { top },
            GameEvent::TurnChanged { phase: game.phase },
        ]);
        Ok(game)
    }

    /// Deals the hands, turns up the first card and gives the human the first turn.
    ///
    /// The human gets the 1st, 3rd, ... card off the deck and the machine the
    /// 2nd, 4th, .... Then cards are turned up until a number card shows; any
    /// special or wild card turned up on the way goes to the discard pile.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::Setup {
            return Err(GameError::AlreadyStarted);
        }
        for i in 0..2 * Self::INITIAL_HAND_SIZE {
            let player = if i % 2 == 0 {
                PlayerId::Human
            } else {
                PlayerId::Machine
            };
            let card = self.take_from_deck()?;
            self.player_mut(player).receive(card);
        }
        let first = loop {
            let card = self.take_from_deck()?;
            if card.face.is_numeric() {
                break card;
            }
            self.deck.discard(card);
        };
        self.table.place(first);
        self.deck.discard(first);
        self.phase = Phase::HumanTurn;
        self.events.extend([
            GameEvent::HandsChanged,
            GameEvent::TableChanged { top: first },
            GameEvent::TurnChanged { phase: self.phase },
        ]);
        Ok(())
    }

    /// Whether `card` may be put on `top`. See [`Face::can_be_played_on()`].
    pub fn is_playable(card: Face, top: Face) -> bool {
        card.can_be_played_on(top)
    }

    /// Plays the card at position `index` of the player's hand, which must be
    /// the card `card_id`.
    ///
    /// On success the card is on the table and the discard pile, special
    /// effects are resolved and the turn has moved on, unless the game ended
    /// or the card grants an extra turn.
    pub fn play_card(
        &mut self,
        player: PlayerId,
        index: usize,
        card_id: CardId,
    ) -> Result<PlayOutcome, GameError> {
        self.ensure_turn(player)?;
        let card = match self.player(player).hand().get(index) {
            Some(&card) if card.id == card_id => card,
            _ => {
                return Err(GameError::InvalidCardPosition {
                    index,
                    expected: card_id,
                })
            }
        };
        if let Some(top) = self.table.top() {
            if !Self::is_playable(card.face, top.face) {
                return Err(GameError::IllegalMove { card, top });
            }
        }

        self.player_mut(player).give_up(index, card_id)?;
        self.table.place(card);
        self.deck.discard(card);
        self.events.push(GameEvent::HandsChanged);
        self.events.push(GameEvent::TableChanged { top: card });

        let requires_extra_turn = self.resolve_special_effects(card, player)?;
        if self.check_terminal().is_none() {
            let next = if requires_extra_turn {
                player
            } else {
                player.opponent()
            };
            self.set_turn(next);
        }
        Ok(PlayOutcome {
            card,
            requires_extra_turn,
        })
    }

    /// Applies what `card` does to the opponent of `acting` and returns
    /// whether `acting` moves again.
    ///
    /// +2 and +4 make the opponent draw and skip them, skip and reserve only
    /// skip them, everything else has no effect.
    pub fn resolve_special_effects(
        &mut self,
        card: Card,
        acting: PlayerId,
    ) -> Result<bool, GameError> {
        self.ensure_running()?;
        let opponent = acting.opponent();
        let requires_extra_turn = match card.face.value {
            Value::DrawTwo => {
                self.force_draw(opponent, 2)?;
                true
            }
            Value::DrawFour => {
                self.force_draw(opponent, 4)?;
                true
            }
            Value::Skip | Value::Reserve => true,
            Value::Number(_) | Value::Wild => false,
        };
        self.check_terminal();
        Ok(requires_extra_turn)
    }

    /// Moves `n` cards from the deck to the player's hand. Does not touch the turn.
    pub fn draw_cards(&mut self, player: PlayerId, n: usize) -> Result<(), GameError> {
        self.ensure_running()?;
        self.deal(player, n)?;
        self.check_terminal();
        Ok(())
    }

    /// The player takes one card instead of playing, which ends their turn.
    pub fn draw_and_end_turn(&mut self, player: PlayerId) -> Result<Card, GameError> {
        self.ensure_turn(player)?;
        let card = self.take_from_deck()?;
        self.player_mut(player).receive(card);
        self.events.push(GameEvent::HandsChanged);
        if self.check_terminal().is_none() {
            self.set_turn(player.opponent());
        }
        Ok(card)
    }

    /// Hands the turn to the opponent without doing anything.
    pub fn pass_turn(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.ensure_turn(player)?;
        self.set_turn(player.opponent());
        Ok(())
    }

    /// Ends the game if a hand is empty and returns the winner.
    ///
    /// The transition to [`Phase::GameOver`] and its [`GameEvent::GameEnded`]
    /// happen at most once; later calls just report the winner again.
    pub fn check_terminal(&mut self) -> Option<PlayerId> {
        match self.phase {
            Phase::GameOver { winner } => return Some(winner),
            Phase::Setup | Phase::Aborted => return None,
            Phase::HumanTurn | Phase::MachineTurn => {}
        }
        let winner = PlayerId::BOTH
            .into_iter()
            .find(|&p| self.player(p).hand().is_empty())?;
        self.phase = Phase::GameOver { winner };
        self.events.push(GameEvent::TurnChanged { phase: self.phase });
        self.events.push(GameEvent::GameEnded { winner });
        Some(winner)
    }

    /// The player announces their last card. Returns `false` if there was
    /// nothing to announce, which changes nothing.
    pub fn declare(&mut self, player: PlayerId) -> bool {
        if self.ensure_running().is_err() {
            return false;
        }
        let accepted = self.player_mut(player).declare();
        if accepted {
            self.events.push(GameEvent::HandsChanged);
        }
        accepted
    }

    /// `accuser` calls out `accused` for not announcing their last card.
    ///
    /// If `accused` holds exactly one card and has not declared it, they draw a
    /// penalty card and `true` is returned.
    pub fn declare_uno(
        &mut self,
        accuser: PlayerId,
        accused: PlayerId,
    ) -> Result<bool, GameError> {
        self.ensure_running()?;
        if accuser == accused || !self.player(accused).owes_declaration() {
            return Ok(false);
        }
        self.deal(accused, 1)?;
        self.check_terminal();
        Ok(true)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn hand(&self, id: PlayerId) -> &Hand {
        self.player(id).hand()
    }

    pub fn top_card(&self) -> Option<Card> {
        self.table.top()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// The number of cards the game was created with.
    pub fn total_cards(&self) -> usize {
        self.total_cards
    }

    /// Cards in the draw pile, the discard pile and both hands. The table card
    /// is part of the discard pile. Always equal to [`Self::total_cards()`].
    pub fn cards_accounted_for(&self) -> usize {
        self.deck.len() + self.players.iter().map(|p| p.hand().len()).sum::<usize>()
    }

    /// Takes all events queued since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn view(&self) -> GameView {
        let human = self.player(PlayerId::Human);
        let machine = self.player(PlayerId::Machine);
        GameView {
            phase: self.phase,
            human_hand: human.hand().clone(),
            machine_card_count: machine.hand().len(),
            top_card: self.table.top(),
            draw_pile_len: self.deck.draw_pile().len(),
            discard_pile_len: self.deck.discard_pile().len(),
            human_owes_declaration: human.owes_declaration(),
            machine_owes_declaration: machine.owes_declaration(),
        }
    }

    fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.index()]
    }

    fn ensure_running(&self) -> Result<(), GameError> {
        match self.phase {
            Phase::Setup => Err(GameError::NotStarted),
            Phase::GameOver { .. } | Phase::Aborted => Err(GameError::GameFinished),
            Phase::HumanTurn | Phase::MachineTurn => Ok(()),
        }
    }

    fn ensure_turn(&self, player: PlayerId) -> Result<(), GameError> {
        self.ensure_running()?;
        if self.phase.turn() != Some(player) {
            return Err(GameError::OutOfTurn { player });
        }
        Ok(())
    }

    fn set_turn(&mut self, player: PlayerId) {
        let phase = Phase::turn_of(player);
        if self.phase != phase {
            self.phase = phase;
            self.events.push(GameEvent::TurnChanged { phase });
        }
    }

    /// Draws one card, ending the game if the deck is exhausted.
    fn take_from_deck(&mut self) -> Result<Card, GameError> {
        self.draw_from_deck().map_err(|err| self.end_on_exhaustion(err))
    }

    fn draw_from_deck(&mut self) -> Result<Card, DeckExhausted> {
        let on_table = self.table.top().map(|card| card.id);
        let hands = [self.players[0].hand(), self.players[1].hand()];
        self.deck.draw(on_table, &hands)
    }

    /// A player whose hand is already empty still wins; otherwise the game
    /// is aborted.
    fn end_on_exhaustion(&mut self, err: DeckExhausted) -> GameError {
        if self.check_terminal().is_none() {
            self.abort();
        }
        err.into()
    }

    fn deal(&mut self, player: PlayerId, n: usize) -> Result<(), GameError> {
        let mut drawn = 0;
        let mut exhausted = None;
        for _ in 0..n {
            match self.draw_from_deck() {
                Ok(card) => {
                    self.player_mut(player).receive(card);
                    drawn += 1;
                }
                Err(err) => {
                    exhausted = Some(err);
                    break;
                }
            }
        }
        if drawn > 0 {
            self.events.push(GameEvent::HandsChanged);
        }
        match exhausted {
            Some(err) => Err(self.end_on_exhaustion(err)),
            None => Ok(()),
        }
    }

    /// The draw a +2 or +4 forces on `player`. Running out of cards is not an
    /// error if the card that forced it was the winning one.
    fn force_draw(&mut self, player: PlayerId, n: usize) -> Result<(), GameError> {
        match self.deal(player, n) {
            Err(GameError::DeckExhausted(_)) if matches!(self.phase, Phase::GameOver { .. }) => {
                Ok(())
            }
            result => result,
        }
    }

    fn abort(&mut self) {
        if !self.phase.is_finished() {
            self.phase = Phase::Aborted;
            self.events.push(GameEvent::TurnChanged { phase: self.phase });
            self.events.push(GameEvent::GameAborted);
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::{Script, Step};
    use crate::{face, STANDARD_CATALOG_SIZE};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn six_each(top: Face, human_first: Face) -> Game {
        let mut human = vec![human_first];
        human.extend([face!("G1"), face!("G2"), face!("G3"), face!("G4"), face!("G5")]);
        let layout = Layout {
            human,
            machine: vec![
                face!("Y1"),
                face!("Y2"),
                face!("Y3"),
                face!("Y4"),
                face!("Y5"),
                face!("Y6"),
            ],
            top,
            draw_pile: vec![
                face!("B1"),
                face!("B2"),
                face!("B3"),
                face!("B4"),
                face!("B5"),
                face!("B6"),
            ],
            discard_pile: vec![],
        };
        let mut game = Game::from_layout(layout, rng()).unwrap();
        game.drain_events();
        game
    }

    fn play_first(game: &mut Game, player: PlayerId) -> Result<PlayOutcome, GameError> {
        let id = game.hand(player).get(0).unwrap().id;
        game.play_card(player, 0, id)
    }

    fn ended_events(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameEnded { .. }))
            .count()
    }

    #[test]
    fn start_deals_alternately_and_turns_up_a_number() {
        // Drawn from the end: 10 cards to deal, then two specials, then a number.
        let mut order = mint_cards([
            face!("R0"),
            face!("R1"),
            face!("R2"),
            face!("R3"),
            face!("R4"),
            face!("R5"),
            face!("R6"),
            face!("R7"),
            face!("R8"),
            face!("R9"),
            face!("BS"),
            face!("+4"),
            face!("G3"),
            face!("Y9"),
        ]);
        let dealt: Vec<Card> = order.clone();
        order.reverse();
        let mut game = Game::new(Deck::stacked(order, Vec::new(), rng()));

        game.start().unwrap();

        let human: Vec<Card> = game.hand(PlayerId::Human).iter().copied().collect();
        let machine: Vec<Card> = game.hand(PlayerId::Machine).iter().copied().collect();
        assert_eq!(human, vec![dealt[0], dealt[2], dealt[4], dealt[6], dealt[8]]);
        assert_eq!(machine, vec![dealt[1], dealt[3], dealt[5], dealt[7], dealt[9]]);
        assert_eq!(game.top_card(), Some(dealt[12]));
        assert_eq!(game.deck().discard_pile(), &[dealt[10], dealt[11], dealt[12]]);
        assert_eq!(game.deck().draw_pile(), &[dealt[13]]);
        assert_eq!(game.phase(), Phase::HumanTurn);
        assert_eq!(game.cards_accounted_for(), game.total_cards());
        assert_eq!(game.start(), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn seeded_start_conserves_the_catalog() {
        let mut game = Game::with_seed(3);
        game.start().unwrap();
        assert_eq!(game.total_cards(), STANDARD_CATALOG_SIZE);
        assert_eq!(game.cards_accounted_for(), STANDARD_CATALOG_SIZE);
        assert_eq!(game.hand(PlayerId::Human).len(), Game::INITIAL_HAND_SIZE);
        assert_eq!(game.hand(PlayerId::Machine).len(), Game::INITIAL_HAND_SIZE);
        assert!(game.top_card().unwrap().face.is_numeric());
    }

    #[test]
    fn nothing_happens_before_the_deal() {
        let mut game = Game::with_seed(3);
        assert_eq!(game.draw_cards(PlayerId::Human, 1), Err(GameError::NotStarted));
        assert_eq!(game.pass_turn(PlayerId::Human), Err(GameError::NotStarted));
        assert_eq!(game.check_terminal(), None);
    }

    #[test]
    fn plus_two_makes_the_opponent_draw_two() {
        let mut game = six_each(face!("B9"), face!("B+2"));
        let outcome = play_first(&mut game, PlayerId::Human).unwrap();
        assert!(outcome.requires_extra_turn);
        assert_eq!(game.hand(PlayerId::Machine).len(), 8);
        assert_eq!(game.hand(PlayerId::Human).len(), 5);
        assert_eq!(game.phase(), Phase::HumanTurn);
        assert_eq!(game.cards_accounted_for(), game.total_cards());
    }

    #[test]
    fn plus_four_makes_the_opponent_draw_four() {
        let mut game = six_each(face!("B9"), face!("+4"));
        play_first(&mut game, PlayerId::Human).unwrap();
        assert_eq!(game.hand(PlayerId::Machine).len(), 10);
        assert_eq!(game.cards_accounted_for(), game.total_cards());
    }

    #[test]
    fn skip_keeps_the_turn() {
        let mut game = six_each(face!("R5"), face!("RS"));
        let outcome = play_first(&mut game, PlayerId::Human).unwrap();
        assert!(outcome.requires_extra_turn);
        assert_eq!(game.phase(), Phase::HumanTurn);
        assert_eq!(game.hand(PlayerId::Machine).len(), 6);
    }

    #[test]
    fn number_passes_the_turn() {
        let mut game = six_each(face!("R5"), face!("R7"));
        let outcome = play_first(&mut game, PlayerId::Human).unwrap();
        assert!(!outcome.requires_extra_turn);
        assert_eq!(game.phase(), Phase::MachineTurn);
        assert_eq!(
            game.drain_events(),
            vec![
                GameEvent::HandsChanged,
                GameEvent::TableChanged { top: outcome.card },
                GameEvent::TurnChanged {
                    phase: Phase::MachineTurn
                },
            ]
        );
        assert_eq!(
            play_first(&mut game, PlayerId::Human),
            Err(GameError::OutOfTurn {
                player: PlayerId::Human
            })
        );
    }

    #[test]
    fn illegal_move_changes_nothing() {
        let mut game = six_each(face!("R5"), face!("B7"));
        let before = game.view();
        let err = play_first(&mut game, PlayerId::Human).unwrap_err();
        assert!(matches!(err, GameError::IllegalMove { .. }));
        assert_eq!(game.view(), before);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn stale_position_is_reported() {
        let mut game = six_each(face!("R5"), face!("R7"));
        let second = game.hand(PlayerId::Human).get(1).unwrap().id;
        assert_eq!(
            game.play_card(PlayerId::Human, 0, second),
            Err(GameError::InvalidCardPosition {
                index: 0,
                expected: second
            })
        );
        assert_eq!(game.hand(PlayerId::Human).len(), 6);
    }

    #[test]
    fn drawing_ends_the_turn() {
        let mut game = six_each(face!("R5"), face!("R7"));
        let drawn = game.draw_and_end_turn(PlayerId::Human).unwrap();
        assert_eq!(drawn.face, face!("B6"));
        assert_eq!(game.hand(PlayerId::Human).len(), 7);
        assert_eq!(game.phase(), Phase::MachineTurn);
        game.pass_turn(PlayerId::Machine).unwrap();
        assert_eq!(game.phase(), Phase::HumanTurn);
    }

    #[test]
    fn last_card_ends_the_game_once() {
        let layout = Layout {
            human: vec![face!("R7")],
            machine: vec![face!("Y1"), face!("Y2")],
            top: face!("R5"),
            draw_pile: vec![face!("B1"), face!("B2")],
            discard_pile: vec![],
        };
        let mut game = Game::from_layout(layout, rng()).unwrap();
        play_first(&mut game, PlayerId::Human).unwrap();
        assert_eq!(
            game.phase(),
            Phase::GameOver {
                winner: PlayerId::Human
            }
        );
        assert_eq!(game.check_terminal(), Some(PlayerId::Human));
        assert_eq!(game.pass_turn(PlayerId::Machine), Err(GameError::GameFinished));
        assert_eq!(game.draw_cards(PlayerId::Machine, 1), Err(GameError::GameFinished));
        assert_eq!(ended_events(&game.drain_events()), 1);
        assert_eq!(game.check_terminal(), Some(PlayerId::Human));
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn draw_card_as_last_card_still_makes_the_opponent_draw() {
        let layout = Layout {
            human: vec![face!("R+2")],
            machine: vec![face!("Y1")],
            top: face!("R5"),
            draw_pile: vec![face!("B1"), face!("B2")],
            discard_pile: vec![],
        };
        let mut game = Game::from_layout(layout, rng()).unwrap();
        let outcome = play_first(&mut game, PlayerId::Human).unwrap();
        assert!(outcome.requires_extra_turn);
        assert_eq!(game.hand(PlayerId::Machine).len(), 3);
        assert_eq!(game.check_terminal(), Some(PlayerId::Human));
    }

    #[test]
    fn winning_draw_card_beats_an_empty_deck() {
        let layout = Layout {
            human: vec![face!("R+2")],
            machine: vec![face!("Y1")],
            top: face!("R5"),
            draw_pile: vec![],
            discard_pile: vec![],
        };
        let mut game = Game::from_layout(layout, rng()).unwrap();
        game.drain_events();

        let outcome = play_first(&mut game, PlayerId::Human).unwrap();

        assert!(outcome.requires_extra_turn);
        assert_eq!(
            game.phase(),
            Phase::GameOver {
                winner: PlayerId::Human
            }
        );
        // Only the reshuffled R5 was left to draw
        assert_eq!(game.hand(PlayerId::Machine).len(), 2);
        let events = game.drain_events();
        assert_eq!(ended_events(&events), 1);
        assert!(!events.contains(&GameEvent::GameAborted));
        assert_eq!(game.cards_accounted_for(), game.total_cards());
    }

    #[test]
    fn partial_penalty_reports_hands_before_the_abort() {
        let layout = Layout {
            human: vec![face!("+4"), face!("G2")],
            machine: vec![face!("Y1"), face!("Y2")],
            top: face!("R5"),
            draw_pile: vec![face!("B1"), face!("B2")],
            discard_pile: vec![],
        };
        let mut game = Game::from_layout(layout, rng()).unwrap();
        game.drain_events();

        assert_eq!(
            play_first(&mut game, PlayerId::Human),
            Err(GameError::DeckExhausted(crate::DeckExhausted))
        );

        // B2, B1 and the reshuffled R5, then nothing is left
        assert_eq!(game.phase(), Phase::Aborted);
        assert_eq!(game.hand(PlayerId::Machine).len(), 5);
        let events = game.drain_events();
        assert_eq!(
            &events[events.len() - 3..],
            &[
                GameEvent::HandsChanged,
                GameEvent::TurnChanged {
                    phase: Phase::Aborted
                },
                GameEvent::GameAborted,
            ]
        );
        assert_eq!(game.cards_accounted_for(), game.total_cards());
    }

    #[test]
    fn missed_declaration_costs_a_card() {
        let layout = Layout {
            human: vec![face!("R7"), face!("G2")],
            machine: vec![face!("Y1"), face!("Y2")],
            top: face!("R5"),
            draw_pile: vec![face!("B1"), face!("B2"), face!("B3")],
            discard_pile: vec![],
        };
        let mut game = Game::from_layout(layout, rng()).unwrap();
        play_first(&mut game, PlayerId::Human).unwrap();
        assert!(game.player(PlayerId::Human).owes_declaration());

        assert_eq!(game.declare_uno(PlayerId::Machine, PlayerId::Machine), Ok(false));
        assert_eq!(game.declare_uno(PlayerId::Machine, PlayerId::Human), Ok(true));
        assert_eq!(game.hand(PlayerId::Human).len(), 2);
        // No longer at one card, so there is nothing left to call out
        assert_eq!(game.declare_uno(PlayerId::Machine, PlayerId::Human), Ok(false));
        assert_eq!(game.cards_accounted_for(), game.total_cards());
    }

    #[test]
    fn declaration_protects_and_is_rearmed() {
        let layout = Layout {
            human: vec![face!("R7"), face!("R8")],
            machine: vec![face!("Y1"), face!("Y2")],
            top: face!("R5"),
            draw_pile: vec![face!("B1"), face!("R3"), face!("B3")],
            discard_pile: vec![],
        };
        let mut game = Game::from_layout(layout, rng()).unwrap();
        play_first(&mut game, PlayerId::Human).unwrap();
        assert!(game.declare(PlayerId::Human));
        assert_eq!(game.declare_uno(PlayerId::Machine, PlayerId::Human), Ok(false));

        // Machine passes; human goes 1 -> 2 -> 1 cards
        game.pass_turn(PlayerId::Machine).unwrap();
        game.draw_and_end_turn(PlayerId::Human).unwrap();
        game.pass_turn(PlayerId::Machine).unwrap();
        assert!(!game.player(PlayerId::Human).owes_declaration());
        play_first(&mut game, PlayerId::Human).unwrap();
        assert!(game.player(PlayerId::Human).owes_declaration());
        assert_eq!(game.declare_uno(PlayerId::Machine, PlayerId::Human), Ok(true));
    }

    #[test]
    fn exhausted_deck_aborts_the_game() {
        let layout = Layout {
            human: vec![face!("R7"), face!("G2")],
            machine: vec![face!("Y1"), face!("Y2")],
            top: face!("R5"),
            draw_pile: vec![],
            discard_pile: vec![],
        };
        let mut game = Game::from_layout(layout, rng()).unwrap();
        game.drain_events();
        assert_eq!(
            game.draw_and_end_turn(PlayerId::Human),
            Err(GameError::DeckExhausted(crate::DeckExhausted))
        );
        assert_eq!(game.phase(), Phase::Aborted);
        assert_eq!(
            game.drain_events(),
            vec![
                GameEvent::TurnChanged {
                    phase: Phase::Aborted
                },
                GameEvent::GameAborted
            ]
        );
        assert_eq!(game.cards_accounted_for(), game.total_cards());
        assert_eq!(game.check_terminal(), None);
    }

    #[test]
    fn replenishes_from_the_discard_pile() {
        let layout = Layout {
            human: vec![face!("R7"), face!("G2")],
            machine: vec![face!("Y1"), face!("Y2")],
            top: face!("R5"),
            draw_pile: vec![],
            discard_pile: vec![face!("B1"), face!("B2"), face!("B3")],
        };
        let mut game = Game::from_layout(layout, rng()).unwrap();
        game.draw_and_end_turn(PlayerId::Human).unwrap();
        assert_eq!(game.deck().draw_pile().len(), 2);
        assert_eq!(game.deck().discard_pile(), &[game.top_card().unwrap()]);
        assert_eq!(game.cards_accounted_for(), game.total_cards());
    }

    #[test]
    fn empty_hands_are_not_a_layout() {
        let layout = Layout {
            human: vec![],
            machine: vec![face!("Y1")],
            top: face!("R5"),
            draw_pile: vec![],
            discard_pile: vec![],
        };
        assert!(matches!(
            Game::from_layout(layout, rng()),
            Err(GameError::InvalidLayout { .. })
        ));
    }

    fn run_script(script: &Script) -> Game {
        let mut game = Game::with_seed(script.seed);
        game.start().unwrap();
        for step in &script.steps {
            let Some(player) = game.phase().turn() else {
                break;
            };
            let _ = match *step {
                Step::Play(n) => {
                    let hand = game.hand(player);
                    let index = n as usize % hand.len();
                    let id = hand.get(index).unwrap().id;
                    game.play_card(player, index, id).map(|_| ())
                }
                Step::Draw => game.draw_and_end_turn(player).map(|_| ()),
                Step::Pass => game.pass_turn(player),
                Step::Declare(who) => {
                    game.declare(who);
                    Ok(())
                }
                Step::Accuse(who) => game.declare_uno(who.opponent(), who).map(|_| ()),
            };
        }
        game
    }

    quickcheck! {
        fn cards_are_conserved(script: Script) -> bool {
            let game = run_script(&script);
            game.cards_accounted_for() == game.total_cards()
        }

        fn game_ends_at_most_once(script: Script) -> bool {
            let mut game = run_script(&script);
            let mut events = game.drain_events();
            let _ = game.check_terminal();
            let _ = game.draw_cards(PlayerId::Human, 1);
            events.extend(game.drain_events());
            let ended = ended_events(&events);
            match game.phase() {
                Phase::GameOver { .. } => ended == 1,
                _ => ended == 0,
            }
        }
    }
}
