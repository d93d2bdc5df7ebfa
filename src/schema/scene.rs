use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Dawn,
    Morning,
    Noon,
    Afternoon,
    Dusk,
    Night,
    Midnight,
}

impl TimeOfDay {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dawn => "Fajar",
            Self::Morning => "Pagi Hari",
            Self::Noon => "Siang Hari",
            Self::Afternoon => "Sore Hari",
            Self::Dusk => "Senja",
            Self::Night => "Malam Hari",
            Self::Midnight => "Tengah Malam",
        }
    }
}

/// Camera movement. Every variant carries a label pair: the authored-language
/// label shown while editing and the cinematic display label that ends up in
/// the composed prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraMotion {
    Static,
    PanLeft,
    PanRight,
    TiltUp,
    TiltDown,
    ZoomIn,
    ZoomOut,
    DollyIn,
    DollyOut,
    Tracking,
    Orbit,
    Handheld,
    Aerial,
}

impl CameraMotion {
    pub fn source_label(&self) -> &'static str {
        self.labels().0
    }

    pub fn display_label(&self) -> &'static str {
        self.labels().1
    }

    fn labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::Static => ("Kamera Diam", "Static Shot"),
            Self::PanLeft => ("Geser ke Kiri", "Pan Left"),
            Self::PanRight => ("Geser ke Kanan", "Pan Right"),
            Self::TiltUp => ("Dongak ke Atas", "Tilt Up"),
            Self::TiltDown => ("Tunduk ke Bawah", "Tilt Down"),
            Self::ZoomIn => ("Perbesar", "Zoom In"),
            Self::ZoomOut => ("Perkecil", "Zoom Out"),
            Self::DollyIn => ("Maju Mendekat", "Dolly In"),
            Self::DollyOut => ("Mundur Menjauh", "Dolly Out"),
            Self::Tracking => ("Mengikuti Subjek", "Tracking Shot"),
            Self::Orbit => ("Memutari Subjek", "Orbit Shot"),
            Self::Handheld => ("Kamera Genggam", "Handheld Shot"),
            Self::Aerial => ("Dari Udara", "Aerial Drone Shot"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lighting {
    Natural,
    GoldenHour,
    Soft,
    Dramatic,
    Backlit,
    Neon,
    Candlelight,
    Moonlight,
}

impl Lighting {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Natural => "Cahaya Alami",
            Self::GoldenHour => "Golden Hour",
            Self::Soft => "Cahaya Lembut",
            Self::Dramatic => "Dramatis Kontras Tinggi",
            Self::Backlit => "Cahaya dari Belakang",
            Self::Neon => "Lampu Neon",
            Self::Candlelight => "Cahaya Lilin",
            Self::Moonlight => "Cahaya Bulan",
        }
    }
}

/// Rendering technique family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Technique {
    Animation3D,
    Animation2D,
    Claymation,
    StopMotion,
    CelShaded,
}

/// Artistic style family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtisticStyle {
    Watercolor,
    Pastel,
    Realistic,
    Cartoon,
    Cyberpunk,
    Vintage,
}

/// Studio/brand look family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudioStyle {
    Pixar,
    Ghibli,
    Disney,
    DreamWorks,
    Aardman,
}

/// One visual style tag. The three families are independent: a scene may
/// combine any number of tags from each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualStyle {
    Technique(Technique),
    Artistic(ArtisticStyle),
    Studio(StudioStyle),
}

impl VisualStyle {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Technique(t) => match t {
                Technique::Animation3D => "Animasi 3D",
                Technique::Animation2D => "Animasi 2D",
                Technique::Claymation => "Claymation",
                Technique::StopMotion => "Stop Motion",
                Technique::CelShaded => "Cel Shaded",
            },
            Self::Artistic(a) => match a {
                ArtisticStyle::Watercolor => "Cat Air",
                ArtisticStyle::Pastel => "Warna Pastel",
                ArtisticStyle::Realistic => "Realistis",
                ArtisticStyle::Cartoon => "Kartun",
                ArtisticStyle::Cyberpunk => "Cyberpunk",
                ArtisticStyle::Vintage => "Vintage",
            },
            Self::Studio(s) => match s {
                StudioStyle::Pixar => "Gaya Pixar",
                StudioStyle::Ghibli => "Gaya Studio Ghibli",
                StudioStyle::Disney => "Gaya Disney",
                StudioStyle::DreamWorks => "Gaya DreamWorks",
                StudioStyle::Aardman => "Gaya Aardman",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Cheerful,
    Calm,
    Tense,
    Sad,
    Mysterious,
    Romantic,
    Epic,
    Funny,
}

impl Mood {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cheerful => "Ceria",
            Self::Calm => "Tenang",
            Self::Tense => "Menegangkan",
            Self::Sad => "Sedih",
            Self::Mysterious => "Misterius",
            Self::Romantic => "Romantis",
            Self::Epic => "Epik",
            Self::Funny => "Lucu",
        }
    }
}

/// Global scene settings.
///
/// `visual_styles` behaves as a set but keeps the order in which styles were
/// switched on, so composition stays stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneAttributes {
    pub location: String,
    pub time_of_day: Option<TimeOfDay>,
    pub camera_motion: Option<CameraMotion>,
    pub lighting: Option<Lighting>,
    pub visual_styles: Vec<VisualStyle>,
    pub mood: Option<Mood>,
    pub sound_music: String,
    pub additional_details: String,
}

impl SceneAttributes {
    /// Flip membership of a style: present styles are removed, absent ones appended.
    pub fn toggle_visual_style(&mut self, style: VisualStyle) {
        if let Some(pos) = self.visual_styles.iter().position(|s| *s == style) {
            self.visual_styles.remove(pos);
        } else {
            self.visual_styles.push(style);
        }
    }

    pub fn apply(&mut self, update: SceneUpdate) {
        match update {
            SceneUpdate::Location(v) => self.location = v,
            SceneUpdate::TimeOfDay(v) => self.time_of_day = v,
            SceneUpdate::CameraMotion(v) => self.camera_motion = v,
            SceneUpdate::Lighting(v) => self.lighting = v,
            SceneUpdate::Mood(v) => self.mood = v,
            SceneUpdate::SoundMusic(v) => self.sound_music = v,
            SceneUpdate::AdditionalDetails(v) => self.additional_details = v,
        }
    }
}

/// A single-field edit to the scene attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneUpdate {
    Location(String),
    TimeOfDay(Option<TimeOfDay>),
    CameraMotion(Option<CameraMotion>),
    Lighting(Option<Lighting>),
    Mood(Option<Mood>),
    SoundMusic(String),
    AdditionalDetails(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_motion_has_distinct_labels() {
        assert_eq!(CameraMotion::Orbit.source_label(), "Memutari Subjek");
        assert_eq!(CameraMotion::Orbit.display_label(), "Orbit Shot");
    }

    #[test]
    fn toggle_is_symmetric_difference() {
        let mut scene = SceneAttributes::default();
        let pixar = VisualStyle::Studio(StudioStyle::Pixar);
        let clay = VisualStyle::Technique(Technique::Claymation);

        scene.toggle_visual_style(pixar);
        scene.toggle_visual_style(clay);
        assert_eq!(scene.visual_styles, vec![pixar, clay]);

        scene.toggle_visual_style(pixar);
        assert_eq!(scene.visual_styles, vec![clay]);
    }

    #[test]
    fn families_combine_freely() {
        let mut scene = SceneAttributes::default();
        scene.toggle_visual_style(VisualStyle::Technique(Technique::Animation3D));
        scene.toggle_visual_style(VisualStyle::Artistic(ArtisticStyle::Pastel));
        scene.toggle_visual_style(VisualStyle::Studio(StudioStyle::Ghibli));
        scene.toggle_visual_style(VisualStyle::Studio(StudioStyle::Pixar));
        assert_eq!(scene.visual_styles.len(), 4);
    }

    #[test]
    fn apply_sets_single_field() {
        let mut scene = SceneAttributes::default();
        scene.apply(SceneUpdate::Location("Taman Kota".to_string()));
        scene.apply(SceneUpdate::Mood(Some(Mood::Calm)));
        assert_eq!(scene.location, "Taman Kota");
        assert_eq!(scene.mood, Some(Mood::Calm));
        assert_eq!(scene.time_of_day, None);
    }
}
