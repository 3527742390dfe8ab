use std::collections::VecDeque;

use board::{PieceKind, Square};
use log::{debug, error, warn};
use mirror::{AppliedMove, BoardState};

use crate::{
    Error, GameId, InboundEvent, MoveMessage, NotationEvent, Orientation, OutboundNotation,
    Players, Result, SessionConfig, SnapshotEvent, Subscription,
};

/// The transport to the game server
///
/// This trait is generic over how messages travel, so a websocket client and a test double can both
/// implement it.
pub trait MessageChannel {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Publish a move made by the local player
    fn send_move(&mut self, mv: &OutboundNotation) -> Result<(), Self::Error>;

    /// Ask the server to send a fresh board snapshot for the game
    fn request_snapshot(&mut self, game_id: GameId) -> Result<(), Self::Error>;
}

/// What handling an event did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionUpdate {
    /// The event was for a game this session no longer follows
    Ignored,
    /// The event was held until the first snapshot arrives
    Buffered,
    /// The event arrived before the first snapshot, but too many already had
    Dropped,
    /// The board was replaced by a snapshot, then buffered moves were played on top of it
    Resynced {
        orientation: Orientation,
        replayed: usize,
    },
    Moved {
        applied: AppliedMove,
        /// Whether this move ended the game
        finished: bool,
    },
    /// The server refused a move, so nothing changed
    Rejected {
        notation: String,
        message: Option<String>,
    },
}

/// A game known from at least one snapshot
#[derive(Clone, Debug)]
struct Game {
    board: BoardState,
    players: Players,
    finished: bool,
}

/// Follows one game at a time, keeping a mirror of its board in step with the server
///
/// Events go in through [`handle`](Self::handle), one at a time and in the order the server sent
/// them. Local moves go out through [`drag`](Self::drag); they only show up on the board once the
/// server broadcasts them back.
pub struct GameSession<C> {
    channel: C,
    config: SessionConfig,
    /// The logged in user, if any
    local_identity: Option<String>,
    subscription: Option<Subscription>,
    /// Fixed by the first snapshot of each subscription
    orientation: Option<Orientation>,
    game: Option<Game>,
    /// Moves which arrived before the first snapshot
    pending: VecDeque<InboundEvent>,
}

impl<C: MessageChannel> GameSession<C> {
    pub fn new(channel: C, config: SessionConfig, local_identity: Option<String>) -> Self {
        Self {
            channel,
            config,
            local_identity,
            subscription: None,
            orientation: None,
            game: None,
            pending: VecDeque::new(),
        }
    }

    /// Start following `game_id`, dropping whatever game was followed before
    ///
    /// Nothing is applied to the board until a snapshot of the new game arrives.
    pub fn subscribe(&mut self, game_id: GameId) -> Subscription {
        self.unsubscribe();
        let subscription = Subscription::new(game_id);
        self.subscription = Some(subscription.clone());
        debug!("Subscribed to game {game_id}");
        subscription
    }

    /// Stop following the current game and forget its board
    pub fn unsubscribe(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            debug!("Unsubscribed from game {}", subscription.game_id());
        }
        self.orientation = None;
        self.game = None;
        self.pending.clear();
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription
            .as_ref()
            .filter(|subscription| subscription.is_active())
    }

    /// The mirrored board, once a snapshot has arrived
    pub fn board(&self) -> Option<&BoardState> {
        self.game.as_ref().map(|game| &game.board)
    }

    /// How the local viewer sees the board, once a snapshot has arrived
    pub fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }

    pub fn players(&self) -> Option<&Players> {
        self.game.as_ref().map(|game| &game.players)
    }

    pub fn is_finished(&self) -> bool {
        self.game.as_ref().is_some_and(|game| game.finished)
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Process one event from the server
    ///
    /// Errors mean the event was discarded and the board is unchanged. If the error means the board
    /// may have drifted from the server's, a snapshot has already been requested (unless turned off
    /// in the config).
    pub fn handle(&mut self, event: InboundEvent) -> Result<SessionUpdate> {
        let game_id = event.game_id();
        let accepted = self
            .subscription
            .as_ref()
            .is_some_and(|subscription| subscription.accepts(game_id));
        if !accepted {
            debug!("Ignoring event for game {game_id}, which isn't followed");
            return Ok(SessionUpdate::Ignored);
        }
        match event {
            InboundEvent::Board { game_id, message } => {
                let snapshot =
                    SnapshotEvent::from_message(game_id, message, self.local_identity.clone())
                        .map_err(|e| {
                            warn!("Discarding board message for game {game_id}: {e}");
                            e
                        })?;
                self.apply_snapshot(snapshot)
            }
            InboundEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            event if self.game.is_none() => Ok(self.buffer(event)),
            InboundEvent::Move { game_id, message } => self.apply_move_message(game_id, message),
            InboundEvent::Notation(event) => {
                let applied = self.apply_notation(event)?;
                Ok(SessionUpdate::Moved {
                    applied,
                    finished: false,
                })
            }
        }
    }

    /// Send the move for the local player dragging the piece on `start` onto `target`
    ///
    /// The board doesn't change until the server echoes the move back.
    pub fn drag(
        &mut self,
        start: Square,
        target: Square,
        promotion: Option<PieceKind>,
    ) -> Result<OutboundNotation> {
        let game_id = self
            .subscription()
            .map(Subscription::game_id)
            .ok_or(Error::NotSubscribed)?;
        let game = self.game.as_ref().ok_or(Error::AwaitingSnapshot(game_id))?;
        if game.finished {
            return Err(Error::GameFinished(game_id));
        }
        let color = self
            .orientation
            .and_then(|orientation| orientation.local_color)
            .ok_or(Error::Spectating)?;
        if game
            .board
            .grid()
            .get(start)
            .is_some_and(|piece| piece.color != color)
        {
            return Err(Error::NotYourPiece(start));
        }
        let notation = game.board.describe_drag(start, target, promotion)?;
        let outbound = OutboundNotation {
            game_id,
            notation: notation.to_string(),
        };
        self.channel
            .send_move(&outbound)
            .map_err(|e| Error::Channel(Box::new(e)))?;
        debug!("Sent {} for game {game_id}", outbound.notation);
        Ok(outbound)
    }

    /// [`drag`](Self::drag), with squares given as they are displayed to the local player
    pub fn drag_displayed(
        &mut self,
        start: Square,
        target: Square,
        promotion: Option<PieceKind>,
    ) -> Result<OutboundNotation> {
        let orientation = self.orientation.unwrap_or(Orientation::SPECTATOR);
        self.drag(
            orientation.from_display(start),
            orientation.from_display(target),
            promotion,
        )
    }

    fn buffer(&mut self, event: InboundEvent) -> SessionUpdate {
        let game_id = event.game_id();
        if self.pending.len() >= self.config.max_buffered_events {
            warn!("Dropping a move for game {game_id}: too many arrived before its first snapshot");
            return SessionUpdate::Dropped;
        }
        debug!("Holding a move for game {game_id} until its first snapshot");
        self.pending.push_back(event);
        SessionUpdate::Buffered
    }

    fn apply_snapshot(&mut self, snapshot: SnapshotEvent) -> Result<SessionUpdate> {
        let game_id = snapshot.game_id;
        let viewer = snapshot
            .local_identity
            .as_deref()
            .or(self.local_identity.as_deref());
        let orientation = *self
            .orientation
            .get_or_insert_with(|| Orientation::for_viewer(&snapshot.players, viewer));
        let game = self.game.get_or_insert_with(|| Game {
            board: BoardState::new(),
            players: snapshot.players.clone(),
            finished: false,
        });
        game.board.replace(snapshot.grid);
        game.players = snapshot.players;

        let mut replayed = 0;
        for event in std::mem::take(&mut self.pending) {
            match self.handle(event) {
                Ok(_) => replayed += 1,
                Err(e) => warn!("Held move for game {game_id} no longer applies: {e}"),
            }
        }
        debug!("Applied snapshot of game {game_id}, then {replayed} held move(s)");
        Ok(SessionUpdate::Resynced {
            orientation,
            replayed,
        })
    }

    fn apply_move_message(
        &mut self,
        game_id: GameId,
        message: MoveMessage,
    ) -> Result<SessionUpdate> {
        let game = self.game.as_mut().ok_or(Error::AwaitingSnapshot(game_id))?;
        if !message.legal {
            debug!(
                "Server rejected {} in game {game_id}: {}",
                message.notation,
                message.message.as_deref().unwrap_or("no reason given"),
            );
            return Ok(SessionUpdate::Rejected {
                notation: message.notation,
                message: message.message,
            });
        }
        let color = game.players.color_of(message.player.as_deref());
        let applied = self.apply_notation(NotationEvent {
            game_id,
            color,
            notation: message.notation,
        })?;
        if message.finished {
            if let Some(game) = self.game.as_mut() {
                game.finished = true;
            }
            debug!(
                "Game {game_id} is over, winner: {}",
                message.winner.as_deref().unwrap_or("none"),
            );
        }
        Ok(SessionUpdate::Moved {
            applied,
            finished: message.finished,
        })
    }

    fn apply_notation(&mut self, event: NotationEvent) -> Result<AppliedMove> {
        let game_id = event.game_id;
        let game = self.game.as_mut().ok_or(Error::AwaitingSnapshot(game_id))?;
        match game.board.apply_notation(event.color, &event.notation) {
            Ok(applied) => {
                debug!("Game {game_id}: {} played {}", event.color, event.notation);
                Ok(applied)
            }
            Err(e) => {
                warn!(
                    "Discarding {:?} by {} in game {game_id}: {e}",
                    event.notation, event.color
                );
                if e.needs_resync() {
                    self.request_resync(game_id);
                }
                Err(e.into())
            }
        }
    }

    fn request_resync(&mut self, game_id: GameId) {
        if !self.config.request_resync_on_divergence {
            return;
        }
        warn!("Board of game {game_id} may have drifted, requesting a snapshot");
        if let Err(e) = self.channel.request_snapshot(game_id) {
            error!("Couldn't request a snapshot of game {game_id}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use board::{Color, Piece};
    use mirror::Grid;

    #[derive(Default)]
    struct RecordingChannel {
        sent: Vec<OutboundNotation>,
        snapshot_requests: Vec<GameId>,
    }
    impl MessageChannel for RecordingChannel {
        type Error = Infallible;

        fn send_move(&mut self, mv: &OutboundNotation) -> Result<(), Self::Error> {
            self.sent.push(mv.clone());
            Ok(())
        }

        fn request_snapshot(&mut self, game_id: GameId) -> Result<(), Self::Error> {
            self.snapshot_requests.push(game_id);
            Ok(())
        }
    }

    const GAME: GameId = GameId(42);

    fn session(identity: &str) -> GameSession<RecordingChannel> {
        let mut session = GameSession::new(
            RecordingChannel::default(),
            SessionConfig::default(),
            Some(identity.to_string()),
        );
        session.subscribe(GAME);
        session
    }

    fn players(first_player_starts: bool) -> Players {
        Players {
            player1: "alice".to_string(),
            player2: Some("bob".to_string()),
            first_player_starts,
        }
    }

    fn snapshot(grid: Grid, first_player_starts: bool) -> InboundEvent {
        InboundEvent::Snapshot(SnapshotEvent {
            game_id: GAME,
            grid,
            players: players(first_player_starts),
            local_identity: None,
        })
    }

    fn move_by(player: &str, notation: &str) -> InboundEvent {
        InboundEvent::Move {
            game_id: GAME,
            message: MoveMessage {
                player: Some(player.to_string()),
                notation: notation.to_string(),
                legal: true,
                message: None,
                finished: false,
                won: false,
                winner: None,
            },
        }
    }

    #[track_caller]
    fn grid(session: &GameSession<RecordingChannel>) -> &Grid {
        session.board().expect("no snapshot applied").grid()
    }

    #[test]
    fn test_moves_wait_for_the_first_snapshot() {
        let mut session = session("alice");
        assert_eq!(
            session.handle(move_by("alice", "e4")).unwrap(),
            SessionUpdate::Buffered
        );
        assert_eq!(
            session.handle(move_by("bob", "e5")).unwrap(),
            SessionUpdate::Buffered
        );
        assert!(session.board().is_none());

        let update = session.handle(snapshot(Grid::initial(), true)).unwrap();
        assert_eq!(
            update,
            SessionUpdate::Resynced {
                orientation: Orientation {
                    local_color: Some(Color::White),
                    inverted: false,
                },
                replayed: 2,
            }
        );
        assert_eq!(
            grid(&session).get(Square::E5),
            Some(Piece::new(Color::Black, PieceKind::Pawn))
        );
    }

    #[test]
    fn test_buffer_is_bounded() {
        let mut session = GameSession::new(
            RecordingChannel::default(),
            SessionConfig {
                max_buffered_events: 1,
                ..SessionConfig::default()
            },
            None,
        );
        session.subscribe(GAME);
        assert_eq!(
            session.handle(move_by("alice", "e4")).unwrap(),
            SessionUpdate::Buffered
        );
        assert_eq!(
            session.handle(move_by("bob", "e5")).unwrap(),
            SessionUpdate::Dropped
        );
        let update = session.handle(snapshot(Grid::initial(), true)).unwrap();
        assert!(matches!(update, SessionUpdate::Resynced { replayed: 1, .. }));
        assert!(!grid(&session).is_empty(Square::E7));
        assert!(grid(&session).is_empty(Square::E2));
    }

    #[test]
    fn test_events_for_other_games_are_ignored() {
        let mut session = session("alice");
        session.handle(snapshot(Grid::initial(), true)).unwrap();
        let other = InboundEvent::Notation(NotationEvent {
            game_id: GameId(7),
            color: Color::White,
            notation: "e4".to_string(),
        });
        assert_eq!(session.handle(other).unwrap(), SessionUpdate::Ignored);

        let subscription = session.subscription().cloned().unwrap();
        subscription.cancel();
        assert_eq!(
            session.handle(move_by("alice", "e4")).unwrap(),
            SessionUpdate::Ignored
        );
        assert_eq!(grid(&session), &Grid::initial());

        session.unsubscribe();
        assert!(session.board().is_none());
        assert_eq!(
            session.handle(move_by("alice", "e4")).unwrap(),
            SessionUpdate::Ignored
        );
    }

    #[test]
    fn test_rejected_moves_change_nothing() {
        let mut session = session("alice");
        session.handle(snapshot(Grid::initial(), true)).unwrap();
        let InboundEvent::Move { game_id, mut message } = move_by("alice", "e5") else {
            unreachable!()
        };
        message.legal = false;
        message.message = Some("illegal move".to_string());
        let update = session
            .handle(InboundEvent::Move { game_id, message })
            .unwrap();
        assert_eq!(
            update,
            SessionUpdate::Rejected {
                notation: "e5".to_string(),
                message: Some("illegal move".to_string()),
            }
        );
        assert_eq!(grid(&session), &Grid::initial());
    }

    #[test]
    fn test_divergence_requests_a_snapshot() {
        let mut session = session("alice");
        session.handle(snapshot(Grid::initial(), true)).unwrap();

        let err = session.handle(move_by("alice", "Zz9")).unwrap_err();
        assert!(!err.needs_resync());
        assert!(session.channel().snapshot_requests.is_empty());

        let err = session.handle(move_by("alice", "Nd4")).unwrap_err();
        assert!(err.needs_resync());
        assert_eq!(session.channel().snapshot_requests, vec![GAME]);
        assert_eq!(grid(&session), &Grid::initial());

        // The requested snapshot puts things right
        let mut fixed = Grid::initial();
        fixed.take(Square::G1);
        fixed.set(Square::F3, Some(Piece::new(Color::White, PieceKind::Knight)));
        session.handle(snapshot(fixed.clone(), true)).unwrap();
        assert_eq!(grid(&session), &fixed);
        assert_eq!(session.board().unwrap().en_passant(), None);
    }

    #[test]
    fn test_orientation_is_fixed_per_subscription() {
        let mut session = session("alice");
        session.handle(snapshot(Grid::initial(), false)).unwrap();
        let black = Orientation {
            local_color: Some(Color::Black),
            inverted: true,
        };
        assert_eq!(session.orientation(), Some(black));
        session.handle(snapshot(Grid::initial(), true)).unwrap();
        assert_eq!(session.orientation(), Some(black));

        session.subscribe(GAME);
        assert_eq!(session.orientation(), None);
        session.handle(snapshot(Grid::initial(), true)).unwrap();
        assert_eq!(session.orientation().unwrap().local_color, Some(Color::White));
    }

    #[test]
    fn test_players_map_to_colors() {
        let mut session = session("bob");
        // alice plays black here, so bob moves first
        session.handle(snapshot(Grid::initial(), false)).unwrap();
        assert_eq!(session.players(), Some(&players(false)));
        session.handle(move_by("bob", "d4")).unwrap();
        session.handle(move_by("alice", "d5")).unwrap();
        assert_eq!(
            grid(&session).get(Square::D4),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
        assert_eq!(
            grid(&session).get(Square::D5),
            Some(Piece::new(Color::Black, PieceKind::Pawn))
        );
    }

    #[test]
    fn test_drags() {
        let mut session = session("alice");
        assert!(matches!(
            session.drag(Square::E2, Square::E4, None),
            Err(Error::AwaitingSnapshot(GAME))
        ));
        session.handle(snapshot(Grid::initial(), true)).unwrap();

        let outbound = session.drag(Square::G1, Square::F3, None).unwrap();
        assert_eq!(outbound.notation, "Nf3");
        assert_eq!(session.channel().sent, vec![outbound]);
        // Not applied until the server says so
        assert_eq!(grid(&session), &Grid::initial());

        assert!(matches!(
            session.drag(Square::E7, Square::E5, None),
            Err(Error::NotYourPiece(Square::E7))
        ));
        assert!(matches!(
            session.drag(Square::E2, Square::E5, None),
            Err(Error::Board(mirror::Error::UnreachableTarget { .. }))
        ));

        session.unsubscribe();
        assert!(matches!(
            session.drag(Square::E2, Square::E4, None),
            Err(Error::NotSubscribed)
        ));
    }

    #[test]
    fn test_black_drags_in_display_coordinates() {
        let mut session = session("bob");
        session.handle(snapshot(Grid::initial(), true)).unwrap();
        // Bob sees black at the bottom, so e7 is drawn where e2 would be for white
        let outbound = session
            .drag_displayed(Square::D2, Square::D4, None)
            .unwrap();
        assert_eq!(outbound.notation, "e5");
    }

    #[test]
    fn test_spectators_cannot_drag() {
        let mut session = session("carol");
        session.handle(snapshot(Grid::initial(), true)).unwrap();
        assert!(matches!(
            session.drag(Square::E2, Square::E4, None),
            Err(Error::Spectating)
        ));
    }

    #[test]
    fn test_finished_games_refuse_drags() {
        let mut session = session("alice");
        session.handle(snapshot(Grid::initial(), true)).unwrap();
        for (player, notation) in [("alice", "f3"), ("bob", "e5"), ("alice", "g4")] {
            session.handle(move_by(player, notation)).unwrap();
        }
        let InboundEvent::Move { game_id, mut message } = move_by("bob", "Qh4#") else {
            unreachable!()
        };
        message.finished = true;
        message.won = true;
        message.winner = Some("bob".to_string());
        let update = session
            .handle(InboundEvent::Move { game_id, message })
            .unwrap();
        let SessionUpdate::Moved { applied, finished } = update else {
            panic!("mate wasn't applied: {update:?}");
        };
        assert!(finished && applied.notation.is_mate());
        assert!(session.is_finished());
        assert!(matches!(
            session.drag(Square::E2, Square::E4, None),
            Err(Error::GameFinished(GAME))
        ));
    }
}
