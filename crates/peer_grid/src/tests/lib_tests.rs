use super::*;

use proptest::prelude::*;
use session_core::Session;

fn peers(ids: &[u32]) -> Vec<PeerId> {
    ids.iter().copied().map(PeerId).collect()
}

fn snapshot(joined: bool, role: ClientRole, ids: &[u32]) -> SessionSnapshot {
    SessionSnapshot {
        initialized: true,
        session: Session {
            joined,
            join_pending: false,
            role,
            channel_name: "channel-x".into(),
            local_uid: joined.then_some(PeerId(1000)),
            preview_available: true,
        },
        peers: peers(ids),
    }
}

fn remote_ids(layout: &GridLayout) -> Vec<u32> {
    layout
        .video
        .as_ref()
        .expect("video area")
        .remote
        .iter()
        .map(|tile| tile.peer_id.0)
        .collect()
}

#[test]
fn five_peers_show_first_four_in_quad() {
    let layout = layout(&snapshot(true, ClientRole::Audience, &[7, 3, 9, 2, 5]));
    let video = layout.video.as_ref().expect("video area");

    assert_eq!(video.arrangement, Arrangement::Quad);
    assert_eq!(remote_ids(&layout), vec![7, 3, 9, 2]);
    assert_eq!(video.hidden_peers, 1);
    let slots: Vec<usize> = video.remote.iter().map(|tile| tile.slot).collect();
    assert_eq!(slots, vec![0, 1, 2, 3]);
}

#[test]
fn joined_broadcaster_without_peers_sees_preview_and_placeholder() {
    let layout = layout(&snapshot(true, ClientRole::Broadcaster, &[]));

    assert_eq!(
        layout.tiles(),
        vec![Tile::NoBroadcasterPlaceholder, Tile::LocalPreview]
    );
}

#[test]
fn audience_with_one_peer_sees_single_full_tile() {
    let layout = layout(&snapshot(true, ClientRole::Audience, &[42]));

    assert_eq!(
        layout.tiles(),
        vec![Tile::Remote(RemoteTile {
            peer_id: PeerId(42),
            slot: 0
        })]
    );
    assert_eq!(
        layout.video.as_ref().map(|v| v.arrangement),
        Some(Arrangement::Single)
    );
}

#[test]
fn arrangement_follows_peer_count() {
    let expected = [
        (0, Arrangement::Empty),
        (1, Arrangement::Single),
        (2, Arrangement::Stacked),
        (3, Arrangement::OneOverTwo),
        (4, Arrangement::Quad),
        (9, Arrangement::Quad),
    ];
    for (n, arrangement) in expected {
        let ids: Vec<u32> = (1..=n).collect();
        let layout = layout(&snapshot(true, ClientRole::Audience, &ids));
        let video = layout.video.expect("video area");
        assert_eq!(video.arrangement, arrangement, "n = {n}");
        assert_eq!(video.remote.len(), n.min(MAX_REMOTE_TILES as u32) as usize);
    }
}

#[test]
fn local_preview_never_takes_a_remote_slot() {
    let layout = layout(&snapshot(true, ClientRole::Broadcaster, &[1, 2, 3]));
    let tiles = layout.tiles();

    assert_eq!(tiles.len(), 4);
    assert_eq!(tiles.last(), Some(&Tile::LocalPreview));
    assert_eq!(remote_ids(&layout), vec![1, 2, 3]);
}

#[test]
fn denied_permissions_hide_local_preview() {
    let mut state = snapshot(true, ClientRole::Broadcaster, &[1]);
    state.session.preview_available = false;

    assert!(!layout(&state).tiles().contains(&Tile::LocalPreview));
}

#[test]
fn no_video_area_before_joining() {
    let layout = layout(&snapshot(false, ClientRole::Broadcaster, &[]));

    assert!(layout.video.is_none());
    assert!(layout.tiles().is_empty());
    assert_eq!(layout.status_line, "You're a broadcaster");
}

#[test]
fn status_line_names_the_role() {
    assert_eq!(status_line(ClientRole::Audience), "You're the audience");
}

#[test]
fn layout_is_reproducible_from_state_alone() {
    let state = snapshot(true, ClientRole::Broadcaster, &[4, 8, 15]);

    assert_eq!(layout(&state), layout(&state));
    assert_eq!(
        layout(&state),
        layout_for(true, ClientRole::Broadcaster, true, &peers(&[4, 8, 15]))
    );
}

#[test]
fn frames_cover_every_tile() {
    let area = Rect::new(0.0, 0.0, 360.0, 640.0);
    let layout = layout(&snapshot(true, ClientRole::Broadcaster, &[1, 2]));
    let frames = layout.video.expect("video area").frames(area);

    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].1, Rect::new(0.0, 0.0, 360.0, 320.0));
    assert_eq!(frames[1].1, Rect::new(0.0, 320.0, 360.0, 320.0));
    assert_eq!(frames[2].0, Tile::LocalPreview);
    assert_eq!(frames[2].1, geometry::local_preview_frame(area));
}

fn distinct(raw: Vec<u32>) -> Vec<u32> {
    let mut seen = Vec::with_capacity(raw.len());
    for id in raw {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

proptest! {
    #[test]
    fn layout_depends_only_on_state(
        raw in prop::collection::vec(1u32..10_000, 0..12),
        joined in any::<bool>(),
        broadcaster in any::<bool>(),
    ) {
        let role = if broadcaster { ClientRole::Broadcaster } else { ClientRole::Audience };
        let state = snapshot(joined, role, &distinct(raw));

        prop_assert_eq!(layout(&state), layout(&state.clone()));
        prop_assert_eq!(
            layout(&state),
            layout_for(joined, role, true, &state.peers)
        );
    }

    #[test]
    fn remote_tiles_never_exceed_capacity(
        raw in prop::collection::vec(1u32..10_000, 0..12),
        broadcaster in any::<bool>(),
    ) {
        let ids = distinct(raw);
        let role = if broadcaster { ClientRole::Broadcaster } else { ClientRole::Audience };
        let grid = layout(&snapshot(true, role, &ids));
        let video = grid.video.expect("video area while joined");

        let shown = ids.len().min(MAX_REMOTE_TILES);
        prop_assert_eq!(video.remote.len(), shown);
        prop_assert_eq!(video.hidden_peers, ids.len() - shown);
        prop_assert!(video.remote.len() <= video.arrangement.capacity());
        for (slot, tile) in video.remote.iter().enumerate() {
            prop_assert_eq!(tile.slot, slot);
            prop_assert_eq!(tile.peer_id, PeerId(ids[slot]));
        }
        prop_assert_eq!(video.local_preview, broadcaster);
    }
}
