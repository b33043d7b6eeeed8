use fundsp::prelude::*;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamBuilder, Sink, mixer::Mixer};

const SAMPLE_RATE: f64 = 44100.0;

/// Fire-and-forget sound effects. If no output device can be opened the
/// game simply runs silent.
pub struct Audio {
    mixer: Option<Mixer>,
    _stream: Option<OutputStream>,
}

impl Audio {
    pub fn new() -> Self {
        match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => {
                let mixer = stream.mixer().clone();
                Self {
                    mixer: Some(mixer),
                    _stream: Some(stream),
                }
            }
            Err(_) => Self {
                mixer: None,
                _stream: None,
            },
        }
    }

    /// Short upward blip on each wing beat.
    pub fn flap(&self) {
        let freq = lfo(|t: f64| lerp11(300.0, 600.0, (t / 0.08).min(1.0)));
        let gain = lfo(|t: f64| lerp11(0.12, 0.0, (t / 0.12).min(1.0)));
        self.play((freq >> sine::<f64>()) * gain, 0.12);
    }

    /// Two-tone chime when a pipe is passed.
    pub fn score(&self) {
        let freq = lfo(|t: f64| if t < 0.08 { 660.0 } else { 880.0 });
        let gain = lfo(|t: f64| lerp11(0.12, 0.0, (t / 0.25).min(1.0)));
        self.play((freq >> sine::<f64>()) * gain, 0.25);
    }

    /// Falling sawtooth sweep on a terminal collision.
    pub fn death(&self) {
        let freq = lfo(|t: f64| lerp11(400.0, 80.0, (t / 0.4).min(1.0)));
        let gain = lfo(|t: f64| lerp11(0.15, 0.0, (t / 0.5).min(1.0)));
        self.play((freq >> saw()) * gain, 0.5);
    }

    fn play(&self, mut unit: impl AudioUnit + 'static, duration: f64) {
        let Some(mixer) = &self.mixer else {
            return;
        };
        let wave = Wave::render(SAMPLE_RATE, duration, &mut unit);
        let samples: Vec<f32> = (0..wave.len()).map(|i| wave.at(0, i)).collect();
        let sink = Sink::connect_new(mixer);
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE as u32, samples));
        sink.detach();
    }
}
