//! # Integration Tests
//!
//! Integration tests and end-to-end tests.
//!
//! Responsibilities:
//! - Contract wire-format tests across crates
//! - Simulated e2e runs (no paired cane required)
//! - Scenario regression baselines

#[cfg(test)]
mod contract_tests {
    use contracts::CanePacket;
    use ingestion::frame;

    #[test]
    fn test_firmware_payload_parses() {
        // A payload byte-for-byte like the firmware sends it
        let payload = br#"{
            "timestamp": 1700000000000,
            "imu": { "yaw": -12.0, "pitch": 2.5, "roll": -0.5 },
            "obstacles": { "upper": null, "lower": 1.8, "servoAngle": 15.0 },
            "waterSensor": { "humidityLevel": 18.0, "rawValue": 740 },
            "gps": { "latitude": 4.0511, "longitude": 9.7679, "altitude": 13.0,
                     "speed": 4.2, "heading": 10.0, "satellitesCount": 7,
                     "hdop": 1.4, "gpsTimestamp": 1700000000000, "fixType": "3d" }
        }"#;

        let packet = frame::decode(&bytes::Bytes::from_static(payload)).unwrap();
        assert_eq!(packet.obstacles.lower, Some(1.8));
        assert_eq!(packet.obstacles.upper, None);
        assert_eq!(packet.water.raw, Some(740));
        assert!(packet.gps.is_valid());
    }

    #[test]
    fn test_packet_line_round_trip() {
        let line = r#"{"timestamp":1700000000000,"imu":{"yaw":-12.0,"pitch":2.5,"roll":-0.5},"obstacles":{"upper":null,"lower":1.8,"servoAngle":15.0},"waterSensor":{"humidityLevel":18.0,"rawValue":740},"gps":{"latitude":4.0511,"longitude":9.7679,"altitude":13.0,"speed":4.2,"heading":10.0,"satellitesCount":7,"hdop":1.4,"gpsTimestamp":1700000000000,"fixType":"3d"}}"#;

        let packet: CanePacket = serde_json::from_str(line).unwrap();
        assert!(packet.gps.is_good_quality());

        let encoded = frame::encode(&packet).unwrap();
        let reparsed = frame::decode_line(&encoded).unwrap();
        assert_eq!(reparsed, packet);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use contracts::{
        CanePacket, Destination, ExecutorConfig, FixKind, GpsFix, ImuReading, NavigatorConfig,
        ObstaclePair, PacketCallback, PacketSource, PipelineConfig, TransportMode, WaterReading,
        Waypoint,
    };
    use guidance::{GuidanceHandle, TracingSpeech};
    use ingestion::{CaneIngest, MockCane, MockScenario};
    use navigation::RouteNavigator;
    use pipeline::{GuidancePipeline, PipelineOptions, PipelineStats};

    fn epoch_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn spawn_guidance() -> GuidanceHandle {
        GuidanceHandle::spawn(TracingSpeech::new("e2e"), ExecutorConfig::default(), 32)
    }

    /// Scripted source emitting a fixed packet sequence at a fast cadence
    struct ScriptedCane {
        packets: Vec<CanePacket>,
        listening: Arc<AtomicBool>,
    }

    impl ScriptedCane {
        fn new(packets: Vec<CanePacket>) -> Self {
            Self {
                packets,
                listening: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl PacketSource for ScriptedCane {
        fn source_name(&self) -> &str {
            "scripted"
        }

        fn listen(&self, callback: PacketCallback) {
            if self.listening.swap(true, Ordering::SeqCst) {
                return;
            }
            let packets = self.packets.clone();
            let listening = self.listening.clone();
            std::thread::spawn(move || {
                for mut packet in packets {
                    if !listening.load(Ordering::Relaxed) {
                        break;
                    }
                    packet.timestamp_ms = epoch_ms();
                    callback(packet);
                    std::thread::sleep(Duration::from_millis(5));
                }
                listening.store(false, Ordering::SeqCst);
            });
        }

        fn stop(&self) {
            self.listening.store(false, Ordering::SeqCst);
        }

        fn is_listening(&self) -> bool {
            self.listening.load(Ordering::Relaxed)
        }
    }

    fn base_packet() -> CanePacket {
        CanePacket {
            timestamp_ms: 0,
            imu: ImuReading::new(0.0, -1.0, 0.5),
            obstacles: ObstaclePair::new(None, Some(6.0), 0.0),
            water: WaterReading::new(10.0, None),
            gps: GpsFix::default(),
        }
    }

    async fn run_scripted(
        packets: Vec<CanePacket>,
        navigator: Option<RouteNavigator>,
    ) -> PipelineStats {
        // The ingest bridge keeps its channel open while alive; bound the
        // run by the script length so the pipeline drains and returns
        let budget = packets.len() as u64;

        let mut ingest = CaneIngest::new(128);
        ingest.register_source(Box::new(ScriptedCane::new(packets)));
        let rx = ingest.take_receiver().unwrap();
        ingest.start();

        let pipeline = GuidancePipeline::new(PipelineConfig::default(), navigator);
        let stats = tokio::time::timeout(
            Duration::from_secs(10),
            pipeline.run(
                rx,
                spawn_guidance(),
                PipelineOptions {
                    max_packets: Some(budget),
                },
            ),
        )
        .await
        .expect("pipeline timed out");

        ingest.stop();
        stats
    }

    /// End-to-end: MockCane -> CaneIngest -> GuidancePipeline -> speech
    #[tokio::test]
    async fn test_e2e_mock_clear_walk() {
        let cane = MockCane::with_scenario("OPEN-EYES", MockScenario::ClearWalk);

        let mut ingest = CaneIngest::new(128);
        ingest.register_source(Box::new(cane));
        let rx = ingest.take_receiver().unwrap();
        ingest.start();

        let pipeline = GuidancePipeline::new(PipelineConfig::default(), None);
        let stats = tokio::time::timeout(
            Duration::from_secs(10),
            pipeline.run(
                rx,
                spawn_guidance(),
                PipelineOptions {
                    max_packets: Some(25),
                },
            ),
        )
        .await
        .expect("pipeline timed out");

        ingest.stop();

        assert_eq!(stats.counters.processed, 25);
        assert_eq!(stats.counters.errored, 0);
        // An open sidewalk speaks the clear-path guidance once, then
        // deduplicates
        assert_eq!(stats.instructions_emitted, 1);
        assert!(stats.deduplicated > 0);
        assert!(stats.decision_metrics.rule_counts.contains_key("clear_path"));
    }

    /// End-to-end: obstacle course raises obstacle rules
    #[tokio::test]
    async fn test_e2e_obstacle_course_warns() {
        let mut packets = Vec::new();
        // Walk into a wall: 6 m down to 0.4 m
        for i in 0..30u32 {
            let mut packet = base_packet();
            packet.obstacles.lower = Some((6.0 - 0.2 * f64::from(i)).max(0.4));
            packets.push(packet);
        }

        let stats = run_scripted(packets, None).await;

        let hits = &stats.decision_metrics.rule_counts;
        assert!(
            hits.contains_key("immediate_obstacle_front")
                || hits.contains_key("medium_obstacle_front"),
            "no obstacle rule fired: {hits:?}"
        );
        assert!(stats.instructions_emitted >= 2);
    }

    /// End-to-end: puddle crossing raises the water rule
    #[tokio::test]
    async fn test_e2e_water_hazard_warns() {
        let mut packets = Vec::new();
        for humidity in [10.0, 15.0, 40.0, 65.0, 80.0, 90.0, 70.0, 30.0] {
            let mut packet = base_packet();
            packet.water.humidity = humidity;
            packets.push(packet);
        }

        let stats = run_scripted(packets, None).await;
        assert!(
            stats.decision_metrics.rule_counts.contains_key("water"),
            "water rule never fired: {:?}",
            stats.decision_metrics.rule_counts
        );
    }

    fn walking_route() -> Destination {
        Destination {
            name: "market".into(),
            transport_mode: TransportMode::Walking,
            total_distance_meters: None,
            estimated_time_seconds: None,
            waypoints: vec![
                Waypoint::new(4.0600, 9.7679),
                Waypoint::new(4.0610, 9.7679),
            ],
        }
    }

    /// End-to-end: three invalid fixes during navigation suspend guidance
    #[tokio::test]
    async fn test_e2e_gps_loss_during_navigation() {
        let mut navigator = RouteNavigator::new(NavigatorConfig::default());
        navigator.load_destination(walking_route()).unwrap();

        let mut packets = Vec::new();

        // A couple of valid fixes walking the route
        for _ in 0..2 {
            let mut packet = base_packet();
            packet.gps = GpsFix {
                latitude: Some(4.0511),
                longitude: Some(9.7679),
                heading: Some(0.0),
                satellites: Some(8),
                hdop: Some(1.0),
                fix_kind: FixKind::ThreeD,
                ..Default::default()
            };
            packets.push(packet);
        }

        // Then the signal dies for good
        for _ in 0..6 {
            packets.push(base_packet());
        }

        let stats = run_scripted(packets, Some(navigator)).await;

        assert_eq!(stats.counters.gps_loss_events, 1);
        assert!(
            stats
                .decision_metrics
                .rule_counts
                .contains_key("gps_lost_during_navigation"),
            "gps-lost rule never fired: {:?}",
            stats.decision_metrics.rule_counts
        );
    }

    /// End-to-end: course deviation during navigation produces corrections
    #[tokio::test]
    async fn test_e2e_off_course_correction() {
        let mut navigator = RouteNavigator::new(NavigatorConfig::default());
        navigator.load_destination(walking_route()).unwrap();

        let mut packets = Vec::new();
        // Route bearing is due north; the walker is heading east
        for _ in 0..6 {
            let mut packet = base_packet();
            packet.gps = GpsFix {
                latitude: Some(4.0511),
                longitude: Some(9.7679),
                heading: Some(90.0),
                satellites: Some(8),
                hdop: Some(1.0),
                fix_kind: FixKind::ThreeD,
                ..Default::default()
            };
            packets.push(packet);
        }

        let stats = run_scripted(packets, Some(navigator)).await;

        assert!(
            stats
                .decision_metrics
                .rule_counts
                .contains_key("gps_navigation"),
            "no course correction fired: {:?}",
            stats.decision_metrics.rule_counts
        );
    }
}
