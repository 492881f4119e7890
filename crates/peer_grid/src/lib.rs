//! Peer-grid presentation: a pure mapping from session state to the tiles a
//! screen should draw.

pub mod geometry;

use serde::Serialize;
use session_core::SessionSnapshot;
use shared::domain::{ClientRole, PeerId};

pub use geometry::{Rect, LOCAL_PREVIEW_HEIGHT, LOCAL_PREVIEW_INSET, LOCAL_PREVIEW_WIDTH};

/// Remote tiles shown at most; later peers stay connected but off screen.
pub const MAX_REMOTE_TILES: usize = 4;

pub const NO_BROADCASTER_TEXT: &str = "No Broadcaster connected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrangement {
    /// Nobody to show; a single placeholder.
    Empty,
    Single,
    /// Two equal tiles, one above the other.
    Stacked,
    /// One full-width tile above two half tiles.
    OneOverTwo,
    /// 2×2 grid.
    Quad,
}

impl Arrangement {
    pub fn for_peer_count(n: usize) -> Self {
        match n {
            0 => Arrangement::Empty,
            1 => Arrangement::Single,
            2 => Arrangement::Stacked,
            3 => Arrangement::OneOverTwo,
            _ => Arrangement::Quad,
        }
    }

    pub fn capacity(self) -> usize {
        match self {
            Arrangement::Empty => 0,
            Arrangement::Single => 1,
            Arrangement::Stacked => 2,
            Arrangement::OneOverTwo => 3,
            Arrangement::Quad => MAX_REMOTE_TILES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemoteTile {
    pub peer_id: PeerId,
    pub slot: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Tile {
    LocalPreview,
    Remote(RemoteTile),
    NoBroadcasterPlaceholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoArea {
    pub arrangement: Arrangement,
    pub remote: Vec<RemoteTile>,
    /// Connected peers beyond the grid's capacity.
    pub hidden_peers: usize,
    pub local_preview: bool,
}

impl VideoArea {
    /// Tiles in draw order: the remote area first, the local preview overlay
    /// last so it sits on top.
    pub fn tiles(&self) -> Vec<Tile> {
        let mut tiles = Vec::with_capacity(self.remote.len() + 2);
        if self.arrangement == Arrangement::Empty {
            tiles.push(Tile::NoBroadcasterPlaceholder);
        }
        tiles.extend(self.remote.iter().copied().map(Tile::Remote));
        if self.local_preview {
            tiles.push(Tile::LocalPreview);
        }
        tiles
    }

    pub fn frames(&self, area: Rect) -> Vec<(Tile, Rect)> {
        self.tiles()
            .into_iter()
            .map(|tile| {
                let frame = match tile {
                    Tile::NoBroadcasterPlaceholder => area,
                    Tile::Remote(remote) => geometry::slot_frame(self.arrangement, remote.slot, area),
                    Tile::LocalPreview => geometry::local_preview_frame(area),
                };
                (tile, frame)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridLayout {
    pub status_line: String,
    /// `None` until the session has joined a channel.
    pub video: Option<VideoArea>,
}

impl GridLayout {
    pub fn tiles(&self) -> Vec<Tile> {
        self.video.as_ref().map(VideoArea::tiles).unwrap_or_default()
    }
}

pub fn status_line(role: ClientRole) -> String {
    match role {
        ClientRole::Broadcaster => "You're a broadcaster".to_string(),
        ClientRole::Audience => "You're the audience".to_string(),
    }
}

pub fn layout(snapshot: &SessionSnapshot) -> GridLayout {
    let session = &snapshot.session;
    layout_for(
        session.joined,
        session.role,
        session.preview_available,
        &snapshot.peers,
    )
}

pub fn layout_for(
    joined: bool,
    role: ClientRole,
    preview_available: bool,
    peers: &[PeerId],
) -> GridLayout {
    let video = joined.then(|| {
        let arrangement = Arrangement::for_peer_count(peers.len());
        let shown = peers.len().min(arrangement.capacity());
        VideoArea {
            arrangement,
            remote: peers[..shown]
                .iter()
                .enumerate()
                .map(|(slot, &peer_id)| RemoteTile { peer_id, slot })
                .collect(),
            hidden_peers: peers.len() - shown,
            local_preview: role.can_publish() && preview_available,
        }
    });

    GridLayout {
        status_line: status_line(role),
        video,
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
