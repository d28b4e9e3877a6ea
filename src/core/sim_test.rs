#[cfg(test)]
mod sim_tests {
    use chrono::Utc;

    use crate::core::alerts::{AlertFilter, AlertId, AlertStore};
    use crate::core::dashboard::Dashboard;
    use crate::core::error::AlertError;
    use crate::core::random::ScriptedSource;
    use crate::core::session::{MemoryStore, SessionHolder};

    #[test]
    fn simulate_operator_shift() {
        let mut session = SessionHolder::new(MemoryStore::new());
        assert!(session.load().is_none());
        let user = session.login("a@b.com", "pw").unwrap();
        assert_eq!(user.name, "a");

        let mut store = AlertStore::seeded(Utc::now());
        let dashboard = Dashboard::new(user, store.subscribe());
        assert_eq!(store.active_count(), 3);
        assert_eq!(dashboard.badge(), 3);

        // Resolve a warning
        store.resolve("2".parse().unwrap()).unwrap();
        assert_eq!(store.active_count(), 2);
        assert!(store.get(AlertId::new(2)).unwrap().resolved);
        assert_eq!(dashboard.badge(), 2);

        // Dismiss the pre-resolved record
        let size = store.len();
        store.dismiss("4".parse().unwrap()).unwrap();
        assert_eq!(store.len(), size - 1);
        assert_eq!(store.active_count(), 2);

        // Unknown id
        let size = store.len();
        assert_eq!(
            store.resolve("999".parse().unwrap()),
            Err(AlertError::NotFound(AlertId::new(999)))
        );
        assert_eq!(store.len(), size);
        assert_eq!(store.active_count(), 2);

        // Two generation ticks, only the first one lands
        let mut rng = ScriptedSource::new()
            .with_chances(&[true, false])
            .with_picks(&[0, 2, 0]);
        let new_id = store.generate_random_alert(&mut rng, Utc::now()).unwrap();
        assert!(store.generate_random_alert(&mut rng, Utc::now()).is_none());
        assert_eq!(store.iter().next().unwrap().title, "Accident Detected");
        assert_eq!(dashboard.badge(), 3);

        // Viewing only critical alerts doesn't move the badge
        store.set_filter(AlertFilter::Critical);
        let active: Vec<AlertId> = store.active_alerts().iter().map(|a| a.id).collect();
        assert_eq!(active, vec![new_id, AlertId::new(1)]);
        assert_eq!(dashboard.badge(), 3);

        session.logout().unwrap();
        assert!(session.load().is_none());
    }
}
