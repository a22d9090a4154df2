fn main() {
    #[cfg(target_os = "windows")]
    {
        let icon_path = std::path::Path::new("assets/windows/vpn-client.ico");
        let rc_path = std::path::Path::new("assets/windows/vpn-client.rc");

        println!("cargo:rerun-if-changed={}", rc_path.display());

        if !icon_path.exists() || !rc_path.exists() {
            println!(
                "cargo:warning=Windows resources missing under assets/windows; building without an icon"
            );
            return;
        }

        if let Err(error) = embed_resource::compile(rc_path, embed_resource::NONE).manifest_optional()
        {
            panic!("failed to embed {}: {error}", rc_path.display());
        }
    }
}
