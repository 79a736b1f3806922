pub mod shared {
    pub mod color;
    pub mod constants;
    pub mod frame;
    pub mod geometry_error;
    pub mod latest_value;
    pub mod mailbox;
    pub mod sequence_info;
    pub mod settings;
}

pub mod capture {
    pub mod domain {
        pub mod capture_device;
    }
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod detected_face;
        pub mod face_detector;
    }
    pub mod infrastructure;
}

pub mod distance {
    pub mod domain {
        pub mod camera_intrinsics;
        pub mod distance_estimate;
        pub mod distance_estimator;
        pub mod distance_selector;
        pub mod distance_source;
        pub mod face_width_source;
        pub mod manual_debug_source;
    }
    pub mod infrastructure {
        pub mod external_sensor_source;
        pub mod sensor_line;
        pub mod sensor_transport;
    }
}

pub mod playback {
    pub mod domain {
        pub mod frame_source;
        pub mod playback_mapper;
        pub mod playback_range;
        pub mod playback_state;
    }
    pub mod infrastructure {
        pub mod ffmpeg_frame_source;
        pub mod image_sequence_source;
        pub mod sequence_catalog;
    }
}

pub mod render {
    pub mod domain {
        pub mod compositor;
        pub mod display_surface;
        pub mod display_target;
        pub mod render_command;
        pub mod tick_report;
    }
    pub mod infrastructure {
        pub mod fixed_period_scheduler;
        pub mod render_loop_factory;
    }
    #[cfg(test)]
    pub(crate) mod fakes;
    pub mod render_loop;
    pub mod tick_logger;
}
