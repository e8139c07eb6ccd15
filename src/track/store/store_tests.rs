#[cfg(test)]
mod tests {
    use crate::track::store::{TrackStore, TrackerState};
    use crate::track::utils::FromVec;
    use crate::track::Feature;
    use crate::utils::bbox::BoundingBox;
    use crate::{Errors, EPS};
    use anyhow::Result;

    fn bbox(x: f32) -> BoundingBox {
        BoundingBox::new(x, 10.0, 50.0, 100.0)
    }

    #[test]
    fn ids_are_sequential() {
        let mut store = TrackStore::new(2);
        assert_eq!(store.next_id(), 0);
        let ids = (0..5)
            .map(|i| store.create(bbox(i as f32 * 100.0), None, 1))
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(store.next_id(), 5);
        assert_eq!(store.stats(), (5, 5));
    }

    #[test]
    fn ids_are_not_reused_after_expiry() {
        let mut store = TrackStore::new(1);
        let first = store.create(bbox(0.0), None, 1);
        assert_eq!(store.prune(3), vec![first]);
        let second = store.create(bbox(0.0), None, 3);
        assert_eq!(second, first + 1);
        assert_eq!(store.stats(), (2, 1));
    }

    #[test]
    fn update() -> Result<()> {
        let mut store = TrackStore::new(5);
        let id = store.create(bbox(0.0), Some(Feature::from_vec(vec![1.0f32, 0.0])), 1);
        store.update(id, bbox(2.0), Some(Feature::from_vec(vec![0.0f32, 1.0])), 2)?;
        let t = store.get(id).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(*t.get_last_box(), bbox(2.0));
        assert_eq!(t.get_last_seen_frame(), 2);
        let d = Vec::<f32>::from_vec(t.get_last_descriptor().unwrap());
        assert!((d[1] - 1.0).abs() < EPS);
        Ok(())
    }

    #[test]
    fn update_unknown_track() {
        let mut store = TrackStore::new(5);
        let err = store.update(42, bbox(0.0), None, 1).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Errors>(),
            Some(&Errors::UnknownTrackReference(42))
        );
        assert_eq!(store.stats(), (0, 0));
    }

    #[test]
    fn expiry_bound() {
        let max_missing = 45;
        let mut store = TrackStore::new(max_missing);
        let id = store.create(bbox(0.0), None, 10);

        for frame in 11..=10 + max_missing {
            assert!(store.prune(frame).is_empty());
            assert!(store.is_active(id));
        }

        assert_eq!(store.prune(10 + max_missing + 1), vec![id]);
        assert!(!store.is_active(id));
        assert!(store.active_tracks().is_empty());
        // the track stays in the log
        assert_eq!(store.get(id).unwrap().get_last_seen_frame(), 10);
        assert_eq!(store.tracks().len(), 1);
    }

    #[test]
    fn active_tracks_are_ordered() {
        let mut store = TrackStore::new(0);
        for i in 0..20 {
            store.create(bbox(i as f32), None, i + 1);
        }
        store.prune(20);
        let active = store
            .active_tracks()
            .iter()
            .map(|t| t.get_track_id())
            .collect::<Vec<_>>();
        assert_eq!(active, vec![19]);
        assert_eq!(store.active_ids().collect::<Vec<_>>(), vec![19]);

        let all = store
            .tracks()
            .iter()
            .map(|t| t.get_track_id())
            .collect::<Vec<_>>();
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn checkpoint_restore() -> Result<()> {
        let mut store = TrackStore::new(3);
        let a = store.create(bbox(0.0), Some(Feature::from_vec(vec![0.5f32; 10])), 1);
        let b = store.create(bbox(300.0), None, 1);
        store.update(a, bbox(1.0), None, 2)?;
        store.update(a, bbox(2.0), None, 6)?;
        store.prune(6);
        assert!(!store.is_active(b));

        let state = store.checkpoint(6, true);
        let restored = TrackStore::restore(3, &state)?;
        assert_eq!(restored.next_id(), 2);
        assert_eq!(restored.stats(), (2, 1));
        assert!(restored.is_active(a));
        let t = restored.get(a).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.get_last_seen_frame(), 6);
        assert_eq!(
            Vec::<f32>::from_vec(t.get_last_descriptor().unwrap())[..10],
            vec![0.5f32; 10][..]
        );

        let state = store.checkpoint(6, false);
        let restored = TrackStore::restore(3, &state)?;
        assert_eq!(restored.get(a).unwrap().len(), 1);
        assert!(restored.get(b).unwrap().get_last_descriptor().is_none());
        Ok(())
    }

    #[test]
    fn invalid_checkpoints() {
        let mut store = TrackStore::new(3);
        store.create(bbox(0.0), None, 1);
        store.create(bbox(200.0), None, 2);
        let state = store.checkpoint(2, false);

        let mut broken = state.clone();
        broken.next_id = 1;
        assert!(TrackStore::restore(3, &broken).is_err());

        let mut broken = state.clone();
        broken.tracks[1].id = 0;
        assert!(TrackStore::restore(3, &broken).is_err());

        let mut broken: TrackerState = state.clone();
        broken.frame = 1;
        let err = TrackStore::restore(3, &broken).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Errors>(),
            Some(Errors::InvalidCheckpoint(_))
        ));

        let mut broken = state;
        broken.tracks[0].history = Some(vec![(bbox(0.0), 1), (bbox(5.0), 2)]);
        assert!(TrackStore::restore(3, &broken).is_err());
    }
}
