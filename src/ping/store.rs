use log::debug;

use super::PingTime;
use crate::error::PipelineError;
use crate::image::{GrayU8, ImageF32};
use crate::types::{GeoPoint, ProjPoint};

/// One sonar transmit/receive cycle.
///
/// The port channel is stored in image order (far range first, nadir last)
/// so that a display row is the plain concatenation `port ++ starboard`.
/// The starboard channel runs near-to-far.
#[derive(Clone, Debug)]
pub struct Ping {
    index: usize,
    time: PingTime,
    geo: GeoPoint,
    projected: Option<ProjPoint>,
    port: Vec<f32>,
    starboard: Vec<f32>,
    slant_ranges: [f64; 2],
    samples: usize,
}

impl Ping {
    /// Construct a raw ping. Both channels must carry the same number of
    /// samples; the projected position is assigned later.
    pub fn new(
        index: usize,
        time: PingTime,
        geo: GeoPoint,
        port: Vec<f32>,
        starboard: Vec<f32>,
        slant_range_m: f64,
    ) -> Result<Self, PipelineError> {
        if port.len() != starboard.len() {
            return Err(PipelineError::DegenerateGeometry {
                detail: format!(
                    "ping {index}: channel sample counts differ ({} vs {})",
                    port.len(),
                    starboard.len()
                ),
            });
        }
        let samples = port.len();
        Ok(Self {
            index,
            time,
            geo,
            projected: None,
            port,
            starboard,
            slant_ranges: [slant_range_m, slant_range_m],
            samples,
        })
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn time(&self) -> PingTime {
        self.time
    }

    #[inline]
    pub fn geo(&self) -> GeoPoint {
        self.geo
    }

    #[inline]
    pub fn projected(&self) -> Option<ProjPoint> {
        self.projected
    }

    pub fn assign_projected(&mut self, p: ProjPoint) {
        self.projected = Some(p);
    }

    #[inline]
    pub fn port(&self) -> &[f32] {
        &self.port
    }

    #[inline]
    pub fn starboard(&self) -> &[f32] {
        &self.starboard
    }

    #[inline]
    pub fn samples(&self) -> usize {
        self.samples
    }

    #[inline]
    pub fn slant_ranges(&self) -> [f64; 2] {
        self.slant_ranges
    }

    /// Combined acquisition width of both channels in meters.
    #[inline]
    pub fn swath_width_m(&self) -> f64 {
        self.slant_ranges[0] + self.slant_ranges[1]
    }

    /// Replace both channel arrays together with the slant range they were
    /// resampled to. Sample count and slant range never change separately.
    pub fn set_ground_samples(
        &mut self,
        port: Vec<f32>,
        starboard: Vec<f32>,
        slant_range_m: f64,
    ) -> Result<(), PipelineError> {
        if port.len() != starboard.len() {
            return Err(PipelineError::DegenerateGeometry {
                detail: format!(
                    "ping {}: resampled channel lengths differ ({} vs {})",
                    self.index,
                    port.len(),
                    starboard.len()
                ),
            });
        }
        self.samples = port.len();
        self.port = port;
        self.starboard = starboard;
        self.slant_ranges = [slant_range_m, slant_range_m];
        Ok(())
    }
}

/// Owner of one file's ping sequence.
pub struct PingStore {
    pings: Vec<Ping>,
}

impl PingStore {
    /// Take ownership of a decoded ping sequence and reconstruct the
    /// sub-second timestamp field.
    pub fn new(mut pings: Vec<Ping>) -> Self {
        reconstruct_subseconds(&mut pings);
        Self { pings }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pings.is_empty()
    }

    #[inline]
    pub fn ping(&self, index: usize) -> &Ping {
        &self.pings[index]
    }

    #[inline]
    pub fn ping_mut(&mut self, index: usize) -> &mut Ping {
        &mut self.pings[index]
    }

    #[inline]
    pub fn pings(&self) -> &[Ping] {
        &self.pings
    }

    /// Estimated ping rate in pings per second over the whole recording.
    pub fn ping_rate(&self) -> Result<f64, PipelineError> {
        if self.pings.len() < 2 {
            return Err(PipelineError::TooFewPings {
                found: self.pings.len(),
                minimum: 2,
            });
        }
        let t0 = self.pings[0].time().to_abs_seconds();
        let t1 = self.pings[self.pings.len() - 1].time().to_abs_seconds();
        let elapsed = t1 - t0;
        if elapsed <= 0.0 {
            return Err(PipelineError::DegenerateGeometry {
                detail: format!("non-increasing timestamps (elapsed {elapsed} s)"),
            });
        }
        Ok(self.pings.len() as f64 / elapsed)
    }

    /// Geographic positions per ping, in ping order.
    pub fn track_wgs84(&self) -> Vec<GeoPoint> {
        self.pings.iter().map(Ping::geo).collect()
    }

    /// Raw amplitude row of one ping: the port channel (far range first)
    /// followed by the starboard channel.
    pub fn image_row(&self, index: usize) -> Vec<f32> {
        let ping = &self.pings[index];
        let mut row = Vec::with_capacity(ping.port().len() + ping.starboard().len());
        row.extend_from_slice(ping.port());
        row.extend_from_slice(ping.starboard());
        row
    }

    /// Assign projected positions, one per ping, in ping order.
    pub fn assign_projected_positions(&mut self, points: &[ProjPoint]) -> Result<(), PipelineError> {
        if points.len() != self.pings.len() {
            return Err(PipelineError::DegenerateGeometry {
                detail: format!(
                    "projected track rows ({}) do not match ping count ({})",
                    points.len(),
                    self.pings.len()
                ),
            });
        }
        for (ping, &p) in self.pings.iter_mut().zip(points) {
            ping.assign_projected(p);
        }
        Ok(())
    }

    /// Index of the first ping recorded after `time`, scanning forward from
    /// `start`; with `reversed`, the first ping before `time` scanning
    /// backward.
    pub fn ping_no_by_time(&self, time: PingTime, start: usize, reversed: bool) -> usize {
        let target = time.to_abs_seconds();
        if reversed {
            let mut no = start.min(self.pings.len().saturating_sub(1));
            while no > 0 {
                if self.pings[no].time().to_abs_seconds() < target {
                    break;
                }
                no -= 1;
            }
            return no;
        }
        let mut no = start;
        while no + 1 < self.pings.len() {
            if self.pings[no].time().to_abs_seconds() > target {
                break;
            }
            no += 1;
        }
        no
    }

    /// Stacked amplitude image of the whole file, channels side by side and
    /// normalized to [0, 1] by the global min/max. Row 0 is the latest ping
    /// (waterfall order). Rows shorter than the widest ping are padded with
    /// zeros at the far range ends.
    pub fn full_image(&self) -> ImageF32 {
        let port_w = self.pings.iter().map(|p| p.port().len()).max().unwrap_or(0);
        let stbd_w = self
            .pings
            .iter()
            .map(|p| p.starboard().len())
            .max()
            .unwrap_or(0);
        let w = port_w + stbd_w;
        let h = self.pings.len();
        let mut img = ImageF32::new(w, h);

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for ping in &self.pings {
            for &v in ping.port().iter().chain(ping.starboard()) {
                min = min.min(v);
                max = max.max(v);
            }
        }
        let span = (max - min).max(1e-8);

        for (no, ping) in self.pings.iter().enumerate() {
            let row_start = (h - 1 - no) * w;
            // Port is far-to-near: right-align against the nadir seam.
            let port = ping.port();
            let offset = row_start + (port_w - port.len());
            for (i, &v) in port.iter().enumerate() {
                img.data[offset + i] = (v - min) / span;
            }
            let stbd = ping.starboard();
            for (i, &v) in stbd.iter().enumerate() {
                img.data[row_start + port_w + i] = (v - min) / span;
            }
        }
        img
    }

    /// Stacked image quantized to 8 bits with gamma adjustment:
    /// `pixel = value^(1/gamma) * 255`.
    pub fn stacked_image(&self, gamma: f64) -> GrayU8 {
        let mut img = self.full_image();
        let inv = (1.0 / gamma) as f32;
        for v in &mut img.data {
            *v = v.powf(inv) * 255.0;
        }
        img.to_gray_u8()
    }
}

/// Distribute the hundredths field evenly across each run of pings sharing
/// one whole-second timestamp: index `j` in a run of length `L` gets
/// `j * 100 / L`.
fn reconstruct_subseconds(pings: &mut [Ping]) {
    let mut run_start = 0;
    for i in 1..=pings.len() {
        let run_ended =
            i == pings.len() || !pings[i].time.same_whole_second(&pings[run_start].time);
        if run_ended {
            let len = i - run_start;
            for j in 0..len {
                pings[run_start + j].time.hseconds = (j * 100 / len) as u32;
            }
            run_start = i;
        }
    }
    debug!("reconstructed sub-second timestamps for {} pings", pings.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping_at(index: usize, second: u32, samples: usize) -> Ping {
        Ping::new(
            index,
            PingTime {
                year: 2024,
                month: 4,
                day: 2,
                hour: 12,
                minute: 0,
                second,
                hseconds: 0,
            },
            GeoPoint {
                lon: 30.0,
                lat: 60.0,
            },
            vec![0.5; samples],
            vec![0.5; samples],
            25.0,
        )
        .expect("valid ping")
    }

    #[test]
    fn subseconds_distributed_over_runs() {
        let pings = vec![
            ping_at(0, 1, 4),
            ping_at(1, 1, 4),
            ping_at(2, 1, 4),
            ping_at(3, 1, 4),
            ping_at(4, 2, 4),
            ping_at(5, 2, 4),
        ];
        let store = PingStore::new(pings);
        let hs: Vec<u32> = store.pings().iter().map(|p| p.time().hseconds).collect();
        assert_eq!(hs, vec![0, 25, 50, 75, 0, 50]);
        for w in store.pings().windows(2) {
            if w[0].time().same_whole_second(&w[1].time()) {
                assert!(w[1].time().hseconds > w[0].time().hseconds);
            }
        }
    }

    #[test]
    fn ping_rate_needs_two_pings() {
        let store = PingStore::new(vec![ping_at(0, 1, 4)]);
        assert!(matches!(
            store.ping_rate(),
            Err(PipelineError::TooFewPings { found: 1, minimum: 2 })
        ));
    }

    #[test]
    fn ping_rate_counts_whole_recording() {
        let pings = (0..10).map(|i| ping_at(i, i as u32, 4)).collect();
        let store = PingStore::new(pings);
        let rate = store.ping_rate().expect("rate");
        // 10 pings over 9 elapsed seconds.
        assert!((rate - 10.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn paired_sample_count_and_slant_range_update() {
        let mut ping = ping_at(0, 1, 8);
        ping.set_ground_samples(vec![0.1; 5], vec![0.2; 5], 19.0)
            .expect("paired update");
        assert_eq!(ping.samples(), 5);
        assert_eq!(ping.slant_ranges(), [19.0, 19.0]);
        assert!(ping
            .set_ground_samples(vec![0.1; 5], vec![0.2; 6], 19.0)
            .is_err());
    }

    #[test]
    fn image_row_concatenates_channels() {
        let mut ping = ping_at(0, 1, 2);
        ping.set_ground_samples(vec![0.1, 0.2], vec![0.3, 0.4], 25.0)
            .unwrap();
        let store = PingStore::new(vec![ping]);
        assert_eq!(store.image_row(0), vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn ping_no_by_time_scans_both_directions() {
        let pings = (0..10).map(|i| ping_at(i, i as u32, 4)).collect();
        let store = PingStore::new(pings);
        let cutoff = PingTime {
            year: 2024,
            month: 4,
            day: 2,
            hour: 12,
            minute: 0,
            second: 4,
            hseconds: 50,
        };
        assert_eq!(store.ping_no_by_time(cutoff, 0, false), 5);
        assert_eq!(store.ping_no_by_time(cutoff, 9, true), 4);
    }

    #[test]
    fn projected_positions_reject_row_mismatch() {
        let mut store = PingStore::new(vec![ping_at(0, 1, 4), ping_at(1, 2, 4)]);
        let short = vec![ProjPoint::new(0.0, 0.0)];
        assert!(store.assign_projected_positions(&short).is_err());
        let full = vec![ProjPoint::new(0.0, 0.0), ProjPoint::new(1.0, 1.0)];
        store.assign_projected_positions(&full).expect("assign");
        assert_eq!(store.ping(1).projected(), Some(ProjPoint::new(1.0, 1.0)));
    }

    #[test]
    fn full_image_is_waterfall_ordered_and_normalized() {
        let mut a = ping_at(0, 1, 2);
        a.set_ground_samples(vec![0.0, 0.0], vec![0.0, 0.0], 25.0)
            .unwrap();
        let mut b = ping_at(1, 2, 2);
        b.set_ground_samples(vec![4.0, 4.0], vec![4.0, 4.0], 25.0)
            .unwrap();
        let store = PingStore::new(vec![a, b]);
        let img = store.full_image();
        assert_eq!((img.w, img.h), (4, 2));
        // Latest ping (all 4.0 -> normalized 1.0) lands on row 0.
        assert!(img.row(0).iter().all(|&v| (v - 1.0).abs() < 1e-6));
        assert!(img.row(1).iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn gamma_one_matches_linear_normalization() {
        let mut a = ping_at(0, 1, 2);
        a.set_ground_samples(vec![0.0, 1.0], vec![2.0, 4.0], 25.0)
            .unwrap();
        let store = PingStore::new(vec![a, ping_at(1, 2, 2)]);
        let linear = store.full_image();
        let gray = store.stacked_image(1.0);
        for (lin, px) in linear.data.iter().zip(&gray.data) {
            assert!((lin * 255.0 - *px as f32).abs() <= 1.0);
        }
    }
}
