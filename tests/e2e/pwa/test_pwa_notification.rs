//! E2E Test: Push Notifications
//!
//! Push payloads become notifications, clicks route to windows:
//! 1. Payload fields override defaults
//! 2. Missing or malformed payloads use defaults
//! 3. Clicking closes the notification and opens or focuses the target
//! 4. Without permission nothing is shown

#[cfg(test)]
mod tests {
    use pearl_e2e_tests::{run, PearlFixtures, PushFixtures, TestHost};
    use pearl_sw::notification::NotificationPermission;
    use pearl_sw::worker::ClickOutcome;
    use pearl_sw::{NotificationClickEvent, PushEvent, WorkerError};

    fn installed() -> TestHost {
        let mut host = TestHost::new();
        host.install(PearlFixtures::config());
        host
    }

    #[test]
    fn test_push_payload_is_shown() {
        let host = installed();
        let shown = run(host.registration.push(&PushEvent::with_text(PushFixtures::full()))).unwrap();

        assert_eq!(shown.title, "Auction ending");
        assert_eq!(shown.options.body, "Your bid on Black Pearl is about to close");
        assert_eq!(shown.options.data.url, "/market");
        assert_eq!(shown.options.icon, "/static/images/avatar-placeholder.png");
        assert_eq!(shown.options.badge, "/static/images/avatar-placeholder.png");
        assert_eq!(shown.options.vibrate, vec![200, 100, 200]);
        assert_eq!(host.notifications.visible(), vec![shown]);
    }

    #[test]
    fn test_partial_payload_fills_defaults() {
        let host = installed();
        let shown =
            run(host.registration.push(&PushEvent::with_text(PushFixtures::title_only()))).unwrap();

        assert_eq!(shown.title, "Pearl harvested");
        assert_eq!(shown.options.body, "New notification from Pearl Verse");
        assert_eq!(shown.options.data.url, "/");
    }

    #[test]
    fn test_degenerate_payloads_use_defaults() {
        let host = installed();
        for data in PushFixtures::degenerate() {
            let event = PushEvent::new(data.map(|d| d.to_vec()));
            let shown = run(host.registration.push(&event)).unwrap();
            assert_eq!(shown.title, "Pearl Verse");
            assert_eq!(shown.options.body, "New notification from Pearl Verse");
            assert_eq!(shown.options.data.url, "/");
        }
        assert_eq!(
            host.notifications.visible().len(),
            PushFixtures::degenerate().len()
        );
    }

    #[test]
    fn test_click_opens_target_window() {
        let host = installed();
        let shown = run(host.registration.push(&PushEvent::with_text(PushFixtures::full()))).unwrap();

        let outcome =
            run(host.registration.notification_click(&NotificationClickEvent::new(shown))).unwrap();
        match outcome {
            ClickOutcome::Opened(client) => {
                assert_eq!(client.url, "http://localhost:5000/market");
                assert!(client.focused);
            }
            other => panic!("expected a new window, got {:?}", other),
        }
        assert!(host.notifications.visible().is_empty());
    }

    #[test]
    fn test_click_focuses_open_window() {
        let host = installed();
        let market = host.clients.add_window("http://localhost:5000/market");
        host.clients.add_window("http://localhost:5000/");
        let shown = run(host.registration.push(&PushEvent::with_text(PushFixtures::full()))).unwrap();

        let outcome =
            run(host.registration.notification_click(&NotificationClickEvent::new(shown))).unwrap();
        assert!(matches!(outcome, ClickOutcome::Focused(ref c) if c.id == market));
        assert_eq!(host.clients.all().len(), 2);
    }

    #[test]
    fn test_click_default_url_opens_root() {
        let host = installed();
        let shown = run(host.registration.push(&PushEvent::default())).unwrap();

        let outcome =
            run(host.registration.notification_click(&NotificationClickEvent::new(shown))).unwrap();
        match outcome {
            ClickOutcome::Opened(client) => assert_eq!(client.url, "http://localhost:5000/"),
            other => panic!("expected a new window, got {:?}", other),
        }
    }

    #[test]
    fn test_denied_permission_shows_nothing() {
        let host = installed();
        host.notifications.set_permission(NotificationPermission::Denied);

        let result = run(host.registration.push(&PushEvent::with_text(PushFixtures::full())));
        assert!(matches!(result, Err(WorkerError::Notification(_))));
        assert!(host.notifications.history().is_empty());
    }
}
